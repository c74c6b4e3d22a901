//! Command handlers behind the `roster` binary.
//!
//! Every handler builds both a JSON value and a human-readable rendering and
//! lets [`CommandOutput`] pick one based on `--json`.

mod billing;
mod browse;
mod config;
mod ls;
mod stats;
mod student;
mod tag;

pub use billing::cmd_billing;
pub use browse::{BrowseCommand, cmd_browse};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use ls::{LsOptions, cmd_ls};
pub use stats::cmd_stats;
pub use student::{cmd_student_create, cmd_student_delete, cmd_student_update};
pub use tag::{cmd_tag_create, cmd_tag_delete, cmd_tag_update};

use std::sync::Arc;

use serde_json::Value;

use crate::cli::OutputOptions;
use crate::client::QueryClient;
use crate::config::Config;
use crate::error::Result;

/// Print pretty JSON to stdout.
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A command result with a JSON form and an optional text form.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when asked for, otherwise the text (falling back to JSON).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

/// Load config and build the shared client.
pub(crate) fn connect() -> Result<(Config, Arc<QueryClient>)> {
    let config = Config::load()?;
    let client = Arc::new(QueryClient::from_config(&config)?);
    Ok((config, client))
}
