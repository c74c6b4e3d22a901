//! Configuration commands for managing roster settings.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config get`: Print one configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{API_TOKEN_ENV, API_URL_ENV, Config};
use crate::error::Result;

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn display_value(key: &str, value: &str) -> String {
    if key == "auth.token" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    }
}

fn env_note(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|_| format!(" {}", format!("(overridden by {var})").yellow()))
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.api_token().is_some();
    let path = Config::config_path();

    let json_output = json!({
        "api": {
            "url": config.api.url,
            "timeout": config.api.timeout,
        },
        "auth": {
            "token_configured": token_configured,
        },
        "list": {
            "page_size": config.list.page_size,
            "debounce_ms": config.list.debounce_ms,
            "cache_policy": config.list.cache_policy.to_string(),
        },
        "config_file": path.to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "api".cyan()));
    match &config.api.url {
        Some(url) => text_output.push_str(&format!("  url: {url}")),
        None => text_output.push_str(&format!("  url: {}", "not configured".dimmed())),
    }
    text_output.push_str(&env_note(API_URL_ENV).unwrap_or_default());
    text_output.push('\n');
    text_output.push_str(&format!("  timeout: {}s\n\n", config.api.timeout));

    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    let token_status = if token_configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    text_output.push_str(&format!("  token: {token_status}"));
    text_output.push_str(&env_note(API_TOKEN_ENV).unwrap_or_default());
    text_output.push_str("\n\n");

    text_output.push_str(&format!("{}:\n", "list".cyan()));
    text_output.push_str(&format!("  page_size: {}\n", config.list.page_size));
    text_output.push_str(&format!("  debounce_ms: {}\n", config.list.debounce_ms));
    text_output.push_str(&format!("  cache_policy: {}\n\n", config.list.cache_policy));

    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", path.display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?.unwrap_or_default();
    let shown = display_value(key, &stored);

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    });
    let text_output = format!("Set {} to {}", key.cyan(), shown);

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?.map(|v| display_value(key, &v));

    let json_output = json!({
        "key": key,
        "value": value,
    });
    let text_output = value.clone().unwrap_or_else(|| "not set".to_string());

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}
