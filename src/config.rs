//! Top-level application configuration.
//!
//! Configuration is stored in `.roster/config.yaml` and includes:
//! - The CRM GraphQL endpoint and request timeout
//! - The API token
//! - List view defaults (page size, search debounce, cache policy)
//!
//! `ROSTER_CONFIG` points at a different file. `ROSTER_API_URL` and
//! `ROSTER_API_TOKEN` override the file at read time and are never written back.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::client::CachePolicy;
use crate::error::{Result, RosterError};
use crate::listview::{DEFAULT_DEBOUNCE, pagination::DEFAULT_PAGE_SIZE};

pub const CONFIG_ENV: &str = "ROSTER_CONFIG";
pub const API_URL_ENV: &str = "ROSTER_API_URL";
pub const API_TOKEN_ENV: &str = "ROSTER_API_TOKEN";

const CONFIG_DIR: &str = ".roster";
const CONFIG_FILE: &str = "config.yaml";

/// Every key `config get`/`config set` understands.
pub const CONFIG_KEYS: &[&str] = &[
    "api.url",
    "api.timeout",
    "auth.token",
    "list.page_size",
    "list.debounce_ms",
    "list.cache_policy",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// GraphQL endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_api_timeout")]
    pub timeout: u64,
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_api_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<ApiToken>,
}

/// API token. Never printed by `Debug`.
#[derive(Clone)]
pub struct ApiToken(SecretString);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

impl Serialize for ApiToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for ApiToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::new(String::deserialize(deserializer)?))
    }
}

/// List view defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Search debounce in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub cache_policy: CachePolicy,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            cache_policy: CachePolicy::default(),
        }
    }
}

/// Env var value, treating empty as unset.
fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RosterError::Config(format!("invalid api.url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RosterError::Config(format!(
            "api.url must use http or https, got '{other}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RosterError::Config(format!("{key} must be a non-negative integer")))
}

/// Reject `api_url`-style keys with a hint, and unknown keys with the list.
fn validate_config_key(key: &str) -> Result<&str> {
    if CONFIG_KEYS.contains(&key) {
        return Ok(key);
    }
    if !key.contains('.')
        && let Some(pos) = key.find('_')
    {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(RosterError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dot_version}'"
        )));
    }
    Err(RosterError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    )))
}

fn io_context(error: std::io::Error, action: &str, path: &Path) -> RosterError {
    RosterError::Io(std::io::Error::new(
        error.kind(),
        format!("Failed to {action} {}: {error}", path.display()),
    ))
}

impl Config {
    /// Resolve the config file.
    ///
    /// `ROSTER_CONFIG` wins. Otherwise a `.roster/` directory in the current
    /// directory is used if present, then the per-user config directory.
    pub fn config_path() -> PathBuf {
        if let Some(path) = env_value(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let local = PathBuf::from(CONFIG_DIR);
        if local.is_dir() {
            return local.join(CONFIG_FILE);
        }

        directories::ProjectDirs::from("dev", "roster", "roster")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .unwrap_or_else(|| local.join(CONFIG_FILE))
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| io_context(e, "read config at", path))?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| io_context(e, "create directory for config at", parent))?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| io_context(e, "write config at", path))?;

        // Set restrictive permissions on Unix (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)
                .map_err(|e| io_context(e, "set permissions on config at", path))?;
        }

        Ok(())
    }

    /// The GraphQL endpoint, from `ROSTER_API_URL` or `api.url`.
    pub fn api_url(&self) -> Result<Url> {
        let raw = env_value(API_URL_ENV)
            .or_else(|| self.api.url.clone())
            .ok_or_else(|| {
                RosterError::Config(format!(
                    "no API endpoint configured. Run `roster config set api.url <url>` or set {API_URL_ENV}"
                ))
            })?;
        parse_endpoint(&raw)
    }

    /// API token from environment variable or config
    pub fn api_token(&self) -> Option<String> {
        env_value(API_TOKEN_ENV)
            .or_else(|| self.auth.token.as_ref().map(|t| t.expose().to_string()))
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.list.debounce_ms)
    }

    /// Read one key as text. The token is returned as stored.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match validate_config_key(key)? {
            "api.url" => self.api.url.clone(),
            "api.timeout" => Some(self.api.timeout.to_string()),
            "auth.token" => self.auth.token.as_ref().map(|t| t.expose().to_string()),
            "list.page_size" => Some(self.list.page_size.to_string()),
            "list.debounce_ms" => Some(self.list.debounce_ms.to_string()),
            "list.cache_policy" => Some(self.list.cache_policy.to_string()),
            _ => None,
        })
    }

    /// Set one key from text, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match validate_config_key(key)? {
            "api.url" => {
                let url = parse_endpoint(value)?;
                self.api.url = Some(url.to_string());
            }
            "api.timeout" => {
                let timeout: u64 = parse_number(key, value)?;
                if timeout == 0 {
                    return Err(RosterError::Config("api.timeout must be at least 1".to_string()));
                }
                self.api.timeout = timeout;
            }
            "auth.token" => {
                let token = value.trim();
                if token.is_empty() {
                    return Err(RosterError::Config("auth.token cannot be empty".to_string()));
                }
                self.auth.token = Some(ApiToken::new(token));
            }
            "list.page_size" => {
                let page_size: u32 = parse_number(key, value)?;
                if page_size == 0 {
                    return Err(RosterError::Config(
                        "list.page_size must be at least 1".to_string(),
                    ));
                }
                self.list.page_size = page_size;
            }
            "list.debounce_ms" => self.list.debounce_ms = parse_number(key, value)?,
            "list.cache_policy" => self.list.cache_policy = value.trim().parse()?,
            _ => {}
        }
        Ok(())
    }
}
