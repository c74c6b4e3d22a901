use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::cli::OutputOptions;
use crate::crm::billing_summary;
use crate::display::{format_money, format_timestamp};
use crate::error::Result;

/// Current plan and amount due
pub async fn cmd_billing(output: OutputOptions) -> Result<()> {
    let (_, client) = connect()?;
    let summary = billing_summary(&client).await?;
    let renews_at = summary.renews_at.as_ref().map(|d| d.0.as_str());

    let json_output = json!({
        "plan": summary.plan,
        "seats": summary.seats,
        "amount_due_cents": summary.amount_due_cents,
        "currency": summary.currency,
        "renews_at": renews_at,
    });

    let mut text = format!("{}\n", "Billing".cyan().bold());
    text.push_str(&format!("  plan:       {}\n", summary.plan));
    text.push_str(&format!("  seats:      {}\n", summary.seats));
    text.push_str(&format!(
        "  amount due: {}",
        format_money(i64::from(summary.amount_due_cents), &summary.currency).bold()
    ));
    if let Some(renews_at) = renews_at {
        text.push_str(&format!("\n  renews:     {}", format_timestamp(renews_at)));
    }

    CommandOutput::new(json_output).with_text(text).print(output)
}
