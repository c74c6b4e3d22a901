use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A single error entry from a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlError {
    pub message: String,
    /// `extensions.code`, when the server provides one
    pub code: Option<String>,
    /// Dotted response path (e.g. `students.data.3.email`)
    pub path: Option<String>,
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(path) = &self.path {
            write!(f, " at {path}")?;
        }
        Ok(())
    }
}

fn join_graphql_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid filter '{0}': {1}")]
    InvalidFilter(String, String),

    #[error("API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("GraphQL error: {}", join_graphql_errors(.errors))]
    GraphQlErrors {
        errors: Vec<GraphQlError>,
        /// Whether the response carried data alongside the errors
        partial_data: bool,
    },

    #[error("response is missing '{0}'")]
    MissingData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A failure recorded in a list snapshot, shared with its observers
    #[error(transparent)]
    Shared(#[from] Arc<RosterError>),
}

impl RosterError {
    /// The underlying error, looking through [`RosterError::Shared`].
    pub fn inner(&self) -> &RosterError {
        match self {
            RosterError::Shared(inner) => inner.inner(),
            other => other,
        }
    }
}

impl RosterError {
    /// Build an API error without an HTTP status.
    pub fn api(message: impl Into<String>) -> Self {
        RosterError::Api {
            status: None,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
