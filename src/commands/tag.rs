use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::cli::OutputOptions;
use crate::crm::forms::{TagForm, TagPatch};
use crate::crm::graphql::TagRef;
use crate::crm::{create_tag, delete_tag, update_tag};
use crate::error::Result;

fn tag_output(action: &str, verb: &str, tag: &TagRef) -> CommandOutput {
    let id = tag.id.inner();
    let json_output = json!({
        "action": action,
        "id": id,
        "name": tag.name,
        "color": tag.color,
        "success": true,
    });
    let text = format!("{verb} tag {} ({})", tag.name.bold(), id.cyan());
    CommandOutput::new(json_output).with_text(text)
}

/// Create a tag
pub async fn cmd_tag_create(form: TagForm, output: OutputOptions) -> Result<()> {
    form.validate()?;
    let (_, client) = connect()?;
    let tag = create_tag(&client, &form).await?;
    tag_output("tag_create", "Created", &tag).print(output)
}

/// Update a tag
pub async fn cmd_tag_update(id: &str, patch: TagPatch, output: OutputOptions) -> Result<()> {
    patch.validate()?;
    let (_, client) = connect()?;
    let tag = update_tag(&client, id, &patch).await?;
    tag_output("tag_update", "Updated", &tag).print(output)
}

/// Delete a tag
pub async fn cmd_tag_delete(id: &str, output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    let tag = delete_tag(&client, id).await?;
    tag_output("tag_delete", "Deleted", &tag).print(output)
}
