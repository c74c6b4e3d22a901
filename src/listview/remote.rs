//! Remote list query adapter.
//!
//! A [`RemoteList`] executes one list operation and publishes the outcome as
//! a [`ListSnapshot`] on a watch channel. Every execution takes a sequence
//! number; only the newest one is allowed to touch the snapshot, so a slow
//! response can never overwrite a faster, newer one.
//!
//! Failures keep the last items and meta visible. Nothing is retried.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::pagination::PaginationMeta;
use super::variables::QueryVariables;
use crate::client::{CachePolicy, GraphQlRequest, QueryClient};
use crate::error::{Result, RosterError};

/// Identity of a remote list operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQueryDescriptor {
    operation_name: String,
    document: String,
    items_key: String,
    /// `None` accepts any filter key
    filter_keys: Option<Vec<String>>,
}

impl ListQueryDescriptor {
    pub fn new(
        operation_name: impl Into<String>,
        document: impl Into<String>,
        items_key: impl Into<String>,
    ) -> Self {
        Self {
            operation_name: operation_name.into(),
            document: document.into(),
            items_key: items_key.into(),
            filter_keys: None,
        }
    }

    /// Declare the filter keys the operation accepts.
    pub fn with_filter_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn items_key(&self) -> &str {
        &self.items_key
    }

    pub fn filter_keys(&self) -> &[String] {
        self.filter_keys.as_deref().unwrap_or(&[])
    }

    /// A descriptor that never declared its keys accepts any filter.
    pub fn accepts_filter(&self, key: &str) -> bool {
        self.filter_keys
            .as_ref()
            .is_none_or(|keys| keys.iter().any(|k| k == key))
    }

    /// [`ListQueryDescriptor::accepts_filter`] as an error naming the accepted keys.
    pub fn check_filter(&self, key: &str) -> Result<()> {
        if self.accepts_filter(key) {
            return Ok(());
        }
        let accepted = match self.filter_keys() {
            [] => "no filters".to_string(),
            keys => keys.join(", "),
        };
        Err(RosterError::InvalidFilter(
            key.to_string(),
            format!("{} accepts {accepted}", self.operation_name),
        ))
    }

    pub fn request(&self, variables: &QueryVariables) -> GraphQlRequest {
        GraphQlRequest::new(self.document.clone(), variables.to_json())
            .with_operation_name(self.operation_name.clone())
    }
}

/// Per-adapter fetch options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub policy: CachePolicy,
    /// Suppress every execution.
    pub skip: bool,
}

/// Coarse lifecycle of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// What observers of a list see.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub meta: Option<PaginationMeta>,
    pub loading: bool,
    pub error: Option<Arc<RosterError>>,
    /// At least one response has been applied
    pub loaded: bool,
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: None,
            loading: false,
            error: None,
            loaded: false,
        }
    }
}

impl<T> ListSnapshot<T> {
    pub fn phase(&self) -> ListPhase {
        if self.loading {
            ListPhase::Loading
        } else if self.error.is_some() {
            ListPhase::Error
        } else if self.loaded {
            ListPhase::Success
        } else {
            ListPhase::Idle
        }
    }
}

/// The `{ data, meta }` payload of a list operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PaginationMeta>,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            meta: None,
        }
    }
}

/// Pull the list payload out of a response's `data`.
///
/// An absent or null key is an empty page, not an error.
pub fn decode_list<T: DeserializeOwned>(data: &Value, items_key: &str) -> Result<ListPage<T>> {
    match data.get(items_key) {
        None | Some(Value::Null) => Ok(ListPage::default()),
        Some(payload) => Ok(serde_json::from_value(payload.clone())?),
    }
}

pub struct RemoteList<T> {
    client: Arc<QueryClient>,
    descriptor: Arc<ListQueryDescriptor>,
    options: FetchOptions,
    state: Arc<watch::Sender<ListSnapshot<T>>>,
    /// Sequence number of the newest execution
    latest: Arc<Mutex<u64>>,
    last_variables: Mutex<Option<QueryVariables>>,
}

impl<T> std::fmt::Debug for RemoteList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteList")
            .field("operation", &self.descriptor.operation_name())
            .field("options", &self.options)
            .field("latest", &*self.latest.lock())
            .finish()
    }
}

impl<T> RemoteList<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        client: Arc<QueryClient>,
        descriptor: ListQueryDescriptor,
        options: FetchOptions,
    ) -> Self {
        let (state, _) = watch::channel(ListSnapshot::default());
        Self {
            client,
            descriptor: Arc::new(descriptor),
            options,
            state: Arc::new(state),
            latest: Arc::new(Mutex::new(0)),
            last_variables: Mutex::new(None),
        }
    }

    pub fn descriptor(&self) -> &ListQueryDescriptor {
        &self.descriptor
    }

    pub fn options(&self) -> FetchOptions {
        self.options
    }

    pub fn last_variables(&self) -> Option<QueryVariables> {
        self.last_variables.lock().clone()
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.state.subscribe()
    }

    /// Wait until no execution is in flight.
    pub async fn settled(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|snapshot| !snapshot.loading).await;
    }

    /// Execute the list operation with these variables under the configured
    /// cache policy. Returns whether anything was dispatched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute(&self, variables: QueryVariables) -> bool {
        self.dispatch(variables, self.options.policy)
    }

    /// Re-run the last variables against the network.
    pub fn refetch(&self) -> bool {
        let Some(variables) = self.last_variables() else {
            tracing::debug!(
                operation = self.descriptor.operation_name(),
                "refetch before first execution ignored"
            );
            return false;
        };
        self.dispatch(variables, CachePolicy::NetworkOnly)
    }

    fn dispatch(&self, variables: QueryVariables, policy: CachePolicy) -> bool {
        if self.options.skip {
            tracing::debug!(operation = self.descriptor.operation_name(), "skipped");
            return false;
        }

        let request = self.descriptor.request(&variables);
        *self.last_variables.lock() = Some(variables);

        let seq = {
            let mut latest = self.latest.lock();
            *latest += 1;
            *latest
        };
        tracing::debug!(
            operation = self.descriptor.operation_name(),
            seq,
            %policy,
            variables = %request.variables,
            "dispatching list query"
        );

        let resolver = Resolver {
            state: Arc::clone(&self.state),
            latest: Arc::clone(&self.latest),
            descriptor: Arc::clone(&self.descriptor),
            seq,
        };

        match policy {
            CachePolicy::CacheFirst => {
                if let Some(data) = self.client.cached(&request) {
                    resolver.apply(Ok(data), false);
                    return true;
                }
            }
            CachePolicy::CacheAndNetwork => {
                if let Some(data) = self.client.cached(&request) {
                    resolver.apply(Ok(data), true);
                }
            }
            CachePolicy::NetworkOnly => {}
        }

        self.state.send_modify(|snapshot| snapshot.loading = true);

        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let outcome = client.fetch(&request, policy).await;
            resolver.apply(outcome, false);
        });
        true
    }
}

/// Applies one execution's outcome if it is still the newest.
struct Resolver<T> {
    state: Arc<watch::Sender<ListSnapshot<T>>>,
    latest: Arc<Mutex<u64>>,
    descriptor: Arc<ListQueryDescriptor>,
    seq: u64,
}

impl<T: DeserializeOwned> Resolver<T> {
    fn apply(&self, outcome: Result<Value>, still_loading: bool) {
        let latest = self.latest.lock();
        if *latest != self.seq {
            tracing::debug!(
                operation = self.descriptor.operation_name(),
                seq = self.seq,
                latest = *latest,
                "discarding stale response"
            );
            return;
        }

        let decoded =
            outcome.and_then(|data| decode_list::<T>(&data, self.descriptor.items_key()));
        match decoded {
            Ok(page) => {
                if let Some(meta) = &page.meta
                    && !meta.is_consistent()
                {
                    tracing::warn!(
                        operation = self.descriptor.operation_name(),
                        ?meta,
                        "server pagination flags disagree with page counts"
                    );
                }
                self.state.send_modify(|snapshot| {
                    snapshot.items = page.data;
                    snapshot.meta = page.meta;
                    snapshot.error = None;
                    snapshot.loading = still_loading;
                    snapshot.loaded = true;
                });
            }
            Err(error) => {
                tracing::warn!(
                    operation = self.descriptor.operation_name(),
                    %error,
                    "list query failed"
                );
                self.state.send_modify(|snapshot| {
                    snapshot.error = Some(Arc::new(error));
                    snapshot.loading = false;
                });
            }
        }
    }
}
