//! GraphQL transport over HTTP.
//!
//! # Security Note - Logging
//!
//! The API token is protected from being logged through reqwest's request
//! logging by the `RedactedHeader` wrapper, whose `Display` and `Debug` print
//! `[REDACTED]`, and by marking the header value sensitive.
//!
//! Keep `RUST_LOG=reqwest=debug` off in production regardless.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{GraphQlError, Result, RosterError};

/// A GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Value,
    #[serde(
        default,
        alias = "operation_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
            operation_name: None,
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Lower a typed `cynic` operation into a plain request.
    pub fn from_operation<ResponseData, Vars>(
        operation: &cynic::Operation<ResponseData, Vars>,
    ) -> Result<Self>
    where
        Vars: Serialize,
    {
        let mut request: Self = serde_json::from_value(serde_json::to_value(operation)?)?;
        if request.operation_name.is_none() {
            request.operation_name = document_operation_name(&request.query);
        }
        Ok(request)
    }
}

/// Name of the first operation in a document, e.g. `Tags` in `query Tags {`.
fn document_operation_name(document: &str) -> Option<String> {
    let mut tokens = document.split_whitespace();
    match tokens.next()? {
        "query" | "mutation" | "subscription" => {}
        _ => return None,
    }
    let name: String = tokens
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Executes GraphQL requests and returns the `data` member of the response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value>;
}

/// Wrapper for sensitive header values that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn new(value: String) -> Self {
        Self { value }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value).map_err(|_| {
            RosterError::Auth("API token contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Error extensions attached to GraphQL errors by the CRM API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    pub code: Option<String>,
}

/// HTTP transport for the CRM GraphQL endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    token: Option<SecretBox<String>>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from configuration.
    ///
    /// The client timeout comes from `api.timeout`; the connect timeout is
    /// capped at the same value.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.api_url()?;
        let timeout = config.api_timeout();

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(std::time::Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: config
                .api_token()
                .map(|token| SecretBox::new(Box::new(token))),
        })
    }

    /// Create a transport for an endpoint with an optional bearer token.
    pub fn new(endpoint: Url, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            token: token.map(|token| SecretBox::new(Box::new(token))),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
        tracing::debug!(
            operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
            endpoint = %self.endpoint,
            "sending GraphQL request"
        );

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            )
            .json(request);

        if let Some(token) = &self.token {
            let auth_header = RedactedHeader::new(format!("Bearer {}", token.expose_secret()));
            builder = builder.header(header::AUTHORIZATION, auth_header.as_header_value()?);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.trim().to_string()
            };
            return Err(RosterError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let result: cynic::GraphQlResponse<Value, ErrorExtensions> = response.json().await?;

        // Keep each error's code and path
        if let Some(errors) = result.errors
            && !errors.is_empty()
        {
            let structured_errors = errors
                .iter()
                .map(|e| GraphQlError {
                    message: e.message.clone(),
                    code: e.extensions.as_ref().and_then(|ext| ext.code.clone()),
                    path: e.path.as_ref().map(|p| {
                        p.iter()
                            .map(|segment| match segment {
                                cynic::GraphQlErrorPathSegment::Field(name) => name.clone(),
                                cynic::GraphQlErrorPathSegment::Index(idx) => idx.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".")
                    }),
                })
                .collect();

            return Err(RosterError::GraphQlErrors {
                errors: structured_errors,
                partial_data: result.data.is_some(),
            });
        }

        result
            .data
            .ok_or_else(|| RosterError::MissingData("data".to_string()))
    }
}
