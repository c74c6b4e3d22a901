use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::listview::{FilterMap, PaginationMeta};

/// Render an RFC 3339 timestamp as `YYYY-MM-DD HH:MM` (UTC).
///
/// Values that do not parse are shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    match raw.parse::<jiff::Timestamp>() {
        Ok(ts) => ts.strftime("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Format an amount in minor units, e.g. `12345, "usd"` -> `123.45 USD`.
pub fn format_money(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{sign}{}.{:02} {}",
        cents / 100,
        cents % 100,
        currency.to_ascii_uppercase()
    )
}

/// Build a rounded table from a header row and string cells.
pub fn render_table(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// `Page 2 of 6 (60 total)`, with the navigation that is available.
pub fn format_page_footer(meta: &PaginationMeta) -> String {
    let mut hints = Vec::new();
    if meta.has_previous_page {
        hints.push("p: previous");
    }
    if meta.has_next_page {
        hints.push("n: next");
    }

    let summary = format!(
        "Page {} of {} ({} total)",
        meta.page,
        meta.total_pages.max(1),
        meta.total
    );
    if hints.is_empty() {
        summary
    } else {
        format!("{summary}  {}", format!("[{}]", hints.join(", ")).dimmed())
    }
}

/// `status=active, tagId=t1`, or `none`.
pub fn format_filters(filters: &FilterMap) -> String {
    let active: Vec<String> = filters
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .filter(|v| v.is_active())
                .map(|v| format!("{key}={v}"))
        })
        .collect();
    if active.is_empty() {
        "none".to_string()
    } else {
        active.join(", ")
    }
}

/// Color a record status for single-line output.
pub fn format_status_colored(status: &str) -> String {
    match status.to_ascii_lowercase().as_str() {
        "active" | "succeeded" | "completed" => status.green().to_string(),
        "running" | "pending" | "queued" => status.cyan().to_string(),
        "failed" | "error" => status.red().to_string(),
        "inactive" | "cancelled" => status.dimmed().to_string(),
        _ => status.to_string(),
    }
}
