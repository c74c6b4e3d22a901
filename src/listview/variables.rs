//! Query variables for list operations.
//!
//! Variables live in a sorted map, so two sets of variables built in a
//! different order compare equal and serialize identically. The serialized
//! form doubles as the cache key.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Variable name for the current page.
pub const PAGE_VAR: &str = "page";
/// Variable name for the page size.
pub const LIMIT_VAR: &str = "limit";
/// Variable name for the free-text search.
pub const SEARCH_VAR: &str = "search";

/// Variables sent with a list operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryVariables(BTreeMap<String, Value>);

impl QueryVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = (String, Value)>) {
        self.0.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn page(&self) -> Option<u64> {
        self.0.get(PAGE_VAR).and_then(Value::as_u64)
    }

    pub fn limit(&self) -> Option<u64> {
        self.0.get(LIMIT_VAR).and_then(Value::as_u64)
    }

    /// Everything except page and limit.
    pub fn shape(&self) -> QueryShape {
        QueryShape(
            self.0
                .iter()
                .filter(|(key, _)| key.as_str() != PAGE_VAR && key.as_str() != LIMIT_VAR)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Canonical JSON text. Stable across insertion order.
    pub fn canonical(&self) -> String {
        canonical_json(&self.to_json())
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for QueryVariables {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Serialize a JSON value with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// The part of the variables that decides *which* records match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryShape(BTreeMap<String, Value>);

impl QueryShape {
    /// Attach a cursor to this shape.
    pub fn with_page(&self, page: u32, limit: u32) -> QueryVariables {
        let mut vars: QueryVariables = self.0.clone().into_iter().collect();
        vars.insert(PAGE_VAR, page);
        vars.insert(LIMIT_VAR, limit);
        vars
    }
}

impl FromIterator<(String, Value)> for QueryShape {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
