//! Recording in-memory transport for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::transport::{GraphQlRequest, Transport};
use crate::error::{Result, RosterError};

/// What the mock answers with, and how long it takes.
pub struct MockReply {
    pub result: Result<Value>,
    pub delay: Duration,
}

impl MockReply {
    pub fn ok(data: Value) -> Self {
        Self {
            result: Ok(data),
            delay: Duration::ZERO,
        }
    }

    pub fn err(error: RosterError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Box<dyn Fn(&GraphQlRequest) -> MockReply + Send + Sync>;

pub struct MockTransport {
    responder: Responder,
    requests: Mutex<Vec<GraphQlRequest>>,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&GraphQlRequest) -> MockReply + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers `{"echo": <variables>}` immediately.
    pub fn echo_variables() -> Arc<Self> {
        Self::new(|request| MockReply::ok(json!({ "echo": request.variables })))
    }

    /// Fails every request with an API error.
    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |_| MockReply::err(RosterError::api(message.clone())))
    }

    pub fn requests(&self) -> Vec<GraphQlRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_variables(&self) -> Option<Value> {
        self.requests.lock().last().map(|r| r.variables.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
        self.requests.lock().push(request.clone());
        let reply = (self.responder)(request);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

/// `data` for one page of a list operation, as the CRM API returns it.
pub fn list_data(items_key: &str, ids: &[String], page: u32, limit: u32, total: u64) -> Value {
    let total_pages = total.div_ceil(u64::from(limit.max(1))) as u32;
    json!({
        items_key: {
            "data": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
            "meta": {
                "total": total,
                "page": page,
                "limit": limit,
                "totalPages": total_pages,
                "hasNextPage": page < total_pages,
                "hasPreviousPage": page > 1,
            }
        }
    })
}
