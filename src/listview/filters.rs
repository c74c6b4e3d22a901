//! Filter state for list views.
//!
//! A filter map holds every key the page has ever touched. A key whose value
//! is `None` (or empty text) is inactive and never reaches the query
//! variables, but it stays in the map so the page can keep rendering the
//! control for it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RosterError};

/// A scalar filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FilterValue {
    /// Inactive values are excluded from the query variables.
    pub fn is_active(&self) -> bool {
        !matches!(self, FilterValue::Text(s) if s.is_empty())
    }

    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Bool(b) => Value::Bool(*b),
            FilterValue::Number(n) => Value::Number(n.clone()),
            FilterValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Number(n) => write!(f, "{n}"),
            FilterValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n.into())
    }
}

impl FromStr for FilterValue {
    type Err = std::convert::Infallible;

    /// `true`/`false` become booleans, anything JSON-numeric becomes a number,
    /// everything else is text.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "true" => return Ok(FilterValue::Bool(true)),
            "false" => return Ok(FilterValue::Bool(false)),
            _ => {}
        }
        if let Ok(Value::Number(n)) = serde_json::from_str::<Value>(s) {
            return Ok(FilterValue::Number(n));
        }
        Ok(FilterValue::Text(s.to_string()))
    }
}

/// Full filter state: key to optional value. `None` means cleared.
pub type FilterMap = BTreeMap<String, Option<FilterValue>>;

type FilterObserver = Box<dyn Fn(&FilterMap) + Send + Sync>;

/// Holds the filter state of one list view.
pub struct FilterStore {
    filters: FilterMap,
    on_change: Option<FilterObserver>,
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("filters", &self.filters)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            filters: FilterMap::new(),
            on_change: None,
        }
    }

    /// Start from caller-supplied defaults.
    pub fn with_defaults(defaults: FilterMap) -> Self {
        Self {
            filters: defaults,
            on_change: None,
        }
    }

    /// Register an observer that receives the full map after every operation.
    pub fn on_change(mut self, observer: impl Fn(&FilterMap) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(observer));
        self
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: Option<FilterValue>) {
        self.filters.insert(key.into(), value);
        self.notify();
    }

    /// Null out one key. The key itself is kept.
    pub fn clear_filter(&mut self, key: &str) {
        self.filters.insert(key.to_string(), None);
        self.notify();
    }

    /// Null out every key, notifying once.
    pub fn clear_all_filters(&mut self) {
        for value in self.filters.values_mut() {
            *value = None;
        }
        self.notify();
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key).and_then(Option::as_ref)
    }

    pub fn active_filters_count(&self) -> usize {
        self.active().count()
    }

    /// Active entries only, ready to merge into query variables.
    pub fn query_filters(&self) -> BTreeMap<String, Value> {
        self.active()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }

    fn active(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.filters
            .iter()
            .filter_map(|(key, value)| match value {
                Some(v) if v.is_active() => Some((key, v)),
                _ => None,
            })
    }

    fn notify(&self) {
        if let Some(observer) = &self.on_change {
            observer(&self.filters);
        }
    }
}

/// Parse a `key=value` filter argument. A bare `key` (or `key=`) clears it.
pub fn parse_filter_arg(arg: &str) -> Result<(String, Option<FilterValue>)> {
    let (key, value) = match arg.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (arg.trim(), ""),
    };

    if key.is_empty() {
        return Err(RosterError::InvalidFilter(
            arg.to_string(),
            "expected key=value".to_string(),
        ));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RosterError::InvalidFilter(
            arg.to_string(),
            "filter keys may only contain letters, digits and '_'".to_string(),
        ));
    }

    let value = if value.is_empty() {
        None
    } else {
        value.parse::<FilterValue>().ok()
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    fn store_with_counter() -> (FilterStore, Arc<AtomicUsize>, Arc<Mutex<FilterMap>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(FilterMap::new()));
        let store = FilterStore::new().on_change({
            let calls = Arc::clone(&calls);
            let last = Arc::clone(&last);
            move |map| {
                calls.fetch_add(1, Ordering::SeqCst);
                *last.lock() = map.clone();
            }
        });
        (store, calls, last)
    }

    #[test]
    fn test_set_filter_notifies_with_full_map() {
        let (mut store, calls, last) = store_with_counter();
        store.set_filter("status", Some("active".into()));
        store.set_filter("tagId", Some("t-1".into()));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let seen = last.lock().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen["status"], Some(FilterValue::Text("active".to_string())));
    }

    #[test]
    fn test_clear_filter_keeps_key() {
        let (mut store, calls, _) = store_with_counter();
        store.set_filter("status", Some("active".into()));
        store.clear_filter("status");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.filters().contains_key("status"));
        assert_eq!(store.filters()["status"], None);
        assert_eq!(store.active_filters_count(), 0);
    }

    #[test]
    fn test_clear_all_notifies_once() {
        let (mut store, calls, last) = store_with_counter();
        store.set_filter("a", Some("1".into()));
        store.set_filter("b", Some(true.into()));
        store.set_filter("c", Some(3i64.into()));
        calls.store(0, Ordering::SeqCst);

        store.clear_all_filters();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(last.lock().len(), 3);
        assert!(store.filters().values().all(Option::is_none));
    }

    #[test]
    fn test_query_filters_exclude_inactive() {
        let mut store = FilterStore::new();
        store.set_filter("status", Some("active".into()));
        store.set_filter("source", Some("".into()));
        store.set_filter("company", None);
        store.set_filter("archived", Some(false.into()));
        store.set_filter("minItems", Some(0i64.into()));

        let query = store.query_filters();
        let keys: Vec<_> = query.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["archived", "minItems", "status"]);
        assert_eq!(store.active_filters_count(), query.len());
        assert_eq!(query["archived"], Value::Bool(false));
        assert_eq!(query["minItems"], serde_json::json!(0));
    }

    #[test]
    fn test_with_defaults() {
        let mut defaults = FilterMap::new();
        defaults.insert("status".to_string(), Some("active".into()));
        defaults.insert("source".to_string(), None);
        let store = FilterStore::with_defaults(defaults);

        assert_eq!(store.active_filters_count(), 1);
        assert_eq!(store.get("status"), Some(&FilterValue::Text("active".into())));
        assert_eq!(store.get("source"), None);
    }

    #[test]
    fn test_filter_value_from_str() {
        assert_eq!("true".parse::<FilterValue>().unwrap(), FilterValue::Bool(true));
        assert_eq!("42".parse::<FilterValue>().unwrap(), FilterValue::from(42i64));
        assert_eq!(
            "2.5".parse::<FilterValue>().unwrap().to_json(),
            serde_json::json!(2.5)
        );
        assert_eq!(
            "active".parse::<FilterValue>().unwrap(),
            FilterValue::Text("active".to_string())
        );
    }

    #[test]
    fn test_parse_filter_arg() {
        assert_eq!(
            parse_filter_arg("status=active").unwrap(),
            ("status".to_string(), Some(FilterValue::Text("active".into())))
        );
        assert_eq!(parse_filter_arg("status").unwrap(), ("status".to_string(), None));
        assert_eq!(parse_filter_arg("status=").unwrap(), ("status".to_string(), None));
        assert!(parse_filter_arg("=active").is_err());
        assert!(parse_filter_arg("bad key=1").is_err());
    }
}
