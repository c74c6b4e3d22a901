use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::cli::{ListArgs, OutputOptions};
use crate::client::{CachePolicy, QueryClient};
use crate::config::Config;
use crate::crm::{Contact, CrmRecord, EntityKind, Run, Student, Tag};
use crate::display::{format_filters, format_page_footer, render_table};
use crate::error::{Result, RosterError};
use crate::listview::{ListSnapshot, ListView, ListViewConfig, parse_filter_arg};

/// Options for listing and browsing
#[derive(Debug, Clone)]
pub struct LsOptions {
    pub entity: EntityKind,
    pub search: Option<String>,
    pub filters: Vec<String>,
    pub page: u32,
    pub page_size: Option<u32>,
    pub policy: Option<CachePolicy>,
}

impl From<ListArgs> for LsOptions {
    fn from(args: ListArgs) -> Self {
        Self {
            entity: args.entity,
            search: args.search,
            filters: args.filters,
            page: args.page,
            page_size: args.page_size,
            policy: args.policy,
        }
    }
}

impl LsOptions {
    /// Resolve flags against config defaults. Filter arguments are parsed and
    /// checked against the list before anything is mounted.
    pub fn view_config(&self, config: &Config) -> Result<ListViewConfig> {
        let descriptor = self.entity.descriptor();
        let mut filters = Vec::with_capacity(self.filters.len());
        for arg in &self.filters {
            let (key, value) = parse_filter_arg(arg)?;
            descriptor.check_filter(&key)?;
            filters.push((key, value));
        }

        let mut view_config = ListViewConfig::new(descriptor)
            .page_size(self.page_size.unwrap_or(config.list.page_size))
            .initial_page(self.page)
            .search_debounce(config.search_debounce())
            .cache_policy(self.policy.unwrap_or(config.list.cache_policy));
        if let Some(search) = &self.search {
            view_config = view_config.search(search.clone());
        }
        for (key, value) in filters {
            view_config = view_config.default_filter(key, value);
        }
        Ok(view_config)
    }
}

/// Surface a failed fetch as the command's error.
pub(crate) fn snapshot_error<T>(snapshot: &ListSnapshot<T>) -> Option<RosterError> {
    snapshot
        .error
        .as_ref()
        .map(|e| RosterError::Shared(Arc::clone(e)))
}

/// Text rendering of the current page: title line, table, footer.
pub(crate) fn render_page<T: CrmRecord>(
    title: &str,
    view: &ListView<T>,
    snapshot: &ListSnapshot<T>,
) -> String {
    let mut text = String::new();

    let search = view.search();
    let mut heading = title.cyan().bold().to_string();
    if !search.trim().is_empty() {
        heading.push_str(&format!("  search: \"{}\"", search.trim()));
    }
    if view.active_filters_count() > 0 {
        heading.push_str(&format!("  filters: {}", format_filters(&view.filters())));
    }
    text.push_str(&heading);
    text.push('\n');

    if snapshot.items.is_empty() {
        text.push_str(&format!("{}\n", "No results.".dimmed()));
    } else {
        text.push_str(&render_table(
            T::headers(),
            snapshot.items.iter().map(T::cells),
        ));
        text.push('\n');
    }

    if let Some(meta) = &snapshot.meta {
        text.push_str(&format_page_footer(meta));
    }
    if let Some(error) = &snapshot.error {
        text.push_str(&format!("\n{} {error}", "error:".red()));
    }
    text
}

fn page_json<T: CrmRecord>(view: &ListView<T>, snapshot: &ListSnapshot<T>) -> serde_json::Value {
    json!({
        "operation": view.descriptor().operation_name(),
        "variables": view.variables().to_json(),
        "items": snapshot.items,
        "meta": snapshot.meta,
    })
}

async fn list_page<T: CrmRecord>(
    client: Arc<QueryClient>,
    view_config: ListViewConfig,
    title: &str,
    output: OutputOptions,
) -> Result<()> {
    let view: ListView<T> = ListView::new(client, view_config);
    view.settled().await;

    let snapshot = view.snapshot();
    if let Some(error) = snapshot_error(&snapshot) {
        return Err(error);
    }

    CommandOutput::new(page_json(&view, &snapshot))
        .with_text(render_page(title, &view, &snapshot))
        .print(output)
}

/// Show one page of a list
pub async fn cmd_ls(options: LsOptions, output: OutputOptions) -> Result<()> {
    let (config, client) = connect()?;
    let view_config = options.view_config(&config)?;
    let title = options.entity.title();

    match options.entity {
        EntityKind::Students => list_page::<Student>(client, view_config, title, output).await,
        EntityKind::Contacts => list_page::<Contact>(client, view_config, title, output).await,
        EntityKind::Tags => list_page::<Tag>(client, view_config, title, output).await,
        EntityKind::Runs => list_page::<Run>(client, view_config, title, output).await,
    }
}
