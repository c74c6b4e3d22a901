use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::cli::OutputOptions;
use crate::crm::student_stats;
use crate::display::format_status_colored;
use crate::error::Result;

/// Student counts by status
pub async fn cmd_stats(output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    let stats = student_stats(&client).await?;

    let text = format!(
        "{}\n  total:    {}\n  {}:   {}\n  {}: {}",
        "Students".cyan().bold(),
        stats.total,
        format_status_colored("active"),
        stats.active,
        format_status_colored("inactive"),
        stats.inactive,
    );

    CommandOutput::new(json!(stats)).with_text(text).print(output)
}
