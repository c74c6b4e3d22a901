//! Normalized-by-request query cache.
//!
//! Entries are keyed by operation and canonical variables, so the same page of
//! the same list with the same filters is one entry no matter how the
//! variables were assembled.

use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transport::GraphQlRequest;
use crate::error::RosterError;
use crate::listview::variables::canonical_json;

/// How a request may use the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Serve a cached result; fetch only when absent.
    #[default]
    CacheFirst,
    /// Serve a cached result immediately, then refresh from the network.
    CacheAndNetwork,
    /// Always go to the network.
    NetworkOnly,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::CacheFirst => write!(f, "cache-first"),
            CachePolicy::CacheAndNetwork => write!(f, "cache-and-network"),
            CachePolicy::NetworkOnly => write!(f, "network-only"),
        }
    }
}

impl FromStr for CachePolicy {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cache-first" => Ok(CachePolicy::CacheFirst),
            "cache-and-network" => Ok(CachePolicy::CacheAndNetwork),
            "network-only" => Ok(CachePolicy::NetworkOnly),
            _ => Err(RosterError::Config(format!(
                "unknown cache policy '{s}', expected cache-first, cache-and-network or network-only"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    variables: String,
}

impl CacheKey {
    pub fn for_request(request: &GraphQlRequest) -> Self {
        Self {
            operation: request
                .operation_name
                .clone()
                .unwrap_or_else(|| request.query.clone()),
            variables: canonical_json(&request.variables),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

/// Response data shared by every view on one client.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<CacheKey, Value>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, request: &GraphQlRequest) -> Option<Value> {
        self.entries
            .get(&CacheKey::for_request(request))
            .map(|entry| entry.value().clone())
    }

    pub fn insert(&self, request: &GraphQlRequest, data: Value) {
        self.entries.insert(CacheKey::for_request(request), data);
    }

    /// Drop every entry for one operation. Returns how many were removed.
    pub fn evict_operation(&self, operation: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.operation != operation);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
