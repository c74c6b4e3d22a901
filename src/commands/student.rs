use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::cli::OutputOptions;
use crate::crm::forms::{StudentForm, StudentPatch};
use crate::crm::graphql::StudentRef;
use crate::crm::{create_student, delete_student, update_student};
use crate::display::format_status_colored;
use crate::error::Result;

fn student_output(action: &str, verb: &str, student: &StudentRef) -> CommandOutput {
    let id = student.id.inner();
    let name = format!("{} {}", student.first_name, student.last_name);
    let json_output = json!({
        "action": action,
        "id": id,
        "first_name": student.first_name,
        "last_name": student.last_name,
        "status": student.status,
        "success": true,
    });
    let text = format!(
        "{verb} student {} ({}) [{}]",
        name.bold(),
        id.cyan(),
        format_status_colored(&student.status)
    );
    CommandOutput::new(json_output).with_text(text)
}

/// Create a student
pub async fn cmd_student_create(form: StudentForm, output: OutputOptions) -> Result<()> {
    form.validate()?;
    let (_, client) = connect()?;
    let student = create_student(&client, &form).await?;
    student_output("student_create", "Created", &student).print(output)
}

/// Update a student
pub async fn cmd_student_update(id: &str, patch: StudentPatch, output: OutputOptions) -> Result<()> {
    patch.validate()?;
    let (_, client) = connect()?;
    let student = update_student(&client, id, &patch).await?;
    student_output("student_update", "Updated", &student).print(output)
}

/// Delete a student
pub async fn cmd_student_delete(id: &str, output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    let student = delete_student(&client, id).await?;
    student_output("student_delete", "Deleted", &student).print(output)
}
