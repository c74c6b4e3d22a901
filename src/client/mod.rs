//! GraphQL client for the CRM API.
//!
//! [`QueryClient`] is the single front door used by list views and the typed
//! commands. It owns the transport and the shared response cache, and decides
//! per request whether the cache may answer.

pub mod cache;
#[cfg(test)]
pub mod mock;
pub mod transport;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use cache::{CachePolicy, QueryCache};
pub use transport::{GraphQlRequest, HttpTransport, Transport};

use crate::config::Config;
use crate::error::Result;

pub struct QueryClient {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl QueryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: QueryCache::new(),
        }
    }

    /// Build a client talking HTTP to the configured endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::from_config(config)?)))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cached `data` for this exact request, if any.
    pub fn cached(&self, request: &GraphQlRequest) -> Option<Value> {
        self.cache.get(request)
    }

    /// Execute a request under a cache policy and return its `data`.
    ///
    /// `CacheFirst` answers from the cache when it can. The other two policies
    /// always hit the network; callers that want the cached value first under
    /// `CacheAndNetwork` read it with [`QueryClient::cached`] before calling.
    /// Every successful network response is written back to the cache.
    pub async fn fetch(&self, request: &GraphQlRequest, policy: CachePolicy) -> Result<Value> {
        if policy == CachePolicy::CacheFirst
            && let Some(data) = self.cache.get(request)
        {
            tracing::debug!(
                operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
                "served from cache"
            );
            return Ok(data);
        }

        let data = self.transport.execute(request).await?;
        self.cache.insert(request, data.clone());
        Ok(data)
    }

    /// Run a typed `cynic` operation.
    pub async fn run<ResponseData, Vars>(
        &self,
        operation: &cynic::Operation<ResponseData, Vars>,
        policy: CachePolicy,
    ) -> Result<ResponseData>
    where
        ResponseData: DeserializeOwned,
        Vars: Serialize,
    {
        let request = GraphQlRequest::from_operation(operation)?;
        let data = self.fetch(&request, policy).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Run a typed mutation. Mutations bypass the cache entirely; on success
    /// every cached response of the `invalidates` operations is dropped so the
    /// next read goes to the network.
    pub async fn mutate<ResponseData, Vars>(
        &self,
        operation: &cynic::Operation<ResponseData, Vars>,
        invalidates: &[&str],
    ) -> Result<ResponseData>
    where
        ResponseData: DeserializeOwned,
        Vars: Serialize,
    {
        let request = GraphQlRequest::from_operation(operation)?;
        let data = self.transport.execute(&request).await?;
        let response = serde_json::from_value(data)?;
        for operation in invalidates {
            self.evict_operation(operation);
        }
        Ok(response)
    }

    /// Forget every cached response of one operation.
    pub fn evict_operation(&self, operation: &str) -> usize {
        let removed = self.cache.evict_operation(operation);
        tracing::debug!(operation, removed, "evicted cached responses");
        removed
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::mock::MockTransport;
    use super::*;

    fn request(page: u64) -> GraphQlRequest {
        GraphQlRequest::new("query Tags { tags { data { id } } }", json!({"page": page}))
            .with_operation_name("Tags")
    }

    #[tokio::test]
    async fn test_cache_first_skips_network_on_hit() {
        let transport = MockTransport::echo_variables();
        let client = QueryClient::new(transport.clone());

        let first = client.fetch(&request(1), CachePolicy::CacheFirst).await.unwrap();
        let second = client.fetch(&request(1), CachePolicy::CacheFirst).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_network_only_always_requests_and_refreshes_cache() {
        let transport = MockTransport::echo_variables();
        let client = QueryClient::new(transport.clone());

        client.fetch(&request(1), CachePolicy::NetworkOnly).await.unwrap();
        client.fetch(&request(1), CachePolicy::NetworkOnly).await.unwrap();

        assert_eq!(transport.request_count(), 2);
        assert!(client.cached(&request(1)).is_some());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let transport = MockTransport::failing("boom");
        let client = QueryClient::new(transport.clone());

        assert!(client.fetch(&request(1), CachePolicy::CacheFirst).await.is_err());
        assert!(client.fetch(&request(1), CachePolicy::CacheFirst).await.is_err());
        assert_eq!(transport.request_count(), 2);
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_evict_operation() {
        let transport = MockTransport::echo_variables();
        let client = QueryClient::new(transport.clone());
        client.fetch(&request(1), CachePolicy::CacheFirst).await.unwrap();
        client.fetch(&request(2), CachePolicy::CacheFirst).await.unwrap();

        assert_eq!(client.evict_operation("Tags"), 2);
        client.fetch(&request(1), CachePolicy::CacheFirst).await.unwrap();
        assert_eq!(transport.request_count(), 3);
    }
}
