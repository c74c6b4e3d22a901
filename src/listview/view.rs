//! List view orchestrator.
//!
//! [`ListView`] ties the search debouncer, the filter store and the
//! pagination controller to one [`RemoteList`]. Every mutation recomposes the
//! query variables as
//!
//! ```text
//! { ...extra, search?, ...active filters, page, limit }
//! ```
//!
//! and dispatches a fetch only when the result differs from what was last
//! dispatched. A change to anything other than page or limit sends the cursor
//! back to the initial page before the variables are composed.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use super::filters::{FilterMap, FilterStore, FilterValue};
use super::pagination::{
    DEFAULT_INITIAL_PAGE, DEFAULT_PAGE_SIZE, PaginationController, PaginationMeta,
};
use super::remote::{FetchOptions, ListQueryDescriptor, ListSnapshot, RemoteList};
use super::variables::{QueryShape, QueryVariables, SEARCH_VAR};
use crate::client::{CachePolicy, QueryClient};
use crate::error::{Result, RosterError};

/// Construction parameters of a [`ListView`].
#[derive(Debug, Clone)]
pub struct ListViewConfig {
    pub descriptor: ListQueryDescriptor,
    pub page_size: u32,
    pub initial_page: u32,
    pub search_debounce: Duration,
    /// Search text in effect at mount, applied without debouncing
    pub initial_search: String,
    pub cache_policy: CachePolicy,
    pub skip: bool,
    pub extra_variables: BTreeMap<String, Value>,
    pub default_filters: FilterMap,
}

impl ListViewConfig {
    pub fn new(descriptor: ListQueryDescriptor) -> Self {
        Self {
            descriptor,
            page_size: DEFAULT_PAGE_SIZE,
            initial_page: DEFAULT_INITIAL_PAGE,
            search_debounce: DEFAULT_DEBOUNCE,
            initial_search: String::new(),
            cache_policy: CachePolicy::default(),
            skip: false,
            extra_variables: BTreeMap::new(),
            default_filters: FilterMap::new(),
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn initial_page(mut self, page: u32) -> Self {
        self.initial_page = page;
        self
    }

    pub fn search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.initial_search = text.into();
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn extra_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_variables.insert(key.into(), value.into());
        self
    }

    pub fn default_filter(mut self, key: impl Into<String>, value: Option<FilterValue>) -> Self {
        self.default_filters.insert(key.into(), value);
        self
    }
}

struct ViewState {
    pager: PaginationController,
    filters: FilterStore,
    /// Settled (debounced) search text
    search: String,
    extra: BTreeMap<String, Value>,
    dispatched: Option<QueryVariables>,
}

impl ViewState {
    fn shape(&self) -> QueryShape {
        let search = self.search.trim();
        let search = (!search.is_empty())
            .then(|| (SEARCH_VAR.to_string(), Value::String(search.to_string())));

        self.extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .chain(search)
            .chain(self.filters.query_filters())
            .collect()
    }

    fn variables(&self) -> QueryVariables {
        self.shape()
            .with_page(self.pager.current_page(), self.pager.page_size())
    }
}

/// Recompose variables and dispatch if they changed. Returns whether a fetch
/// went out.
fn sync<T>(state: &mut ViewState, remote: &RemoteList<T>) -> bool
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let shape = state.shape();
    if state.pager.observe_shape(&shape) {
        tracing::debug!(
            operation = remote.descriptor().operation_name(),
            page = state.pager.current_page(),
            "query changed, back to initial page"
        );
    }

    let variables = shape.with_page(state.pager.current_page(), state.pager.page_size());
    if state.dispatched.as_ref() == Some(&variables) {
        return false;
    }
    state.dispatched = Some(variables.clone());
    remote.execute(variables)
}

type FiltersObserver = Arc<dyn Fn(&FilterMap) + Send + Sync>;

/// A remote-backed, paginated, filterable, searchable list.
pub struct ListView<T> {
    state: Arc<Mutex<ViewState>>,
    remote: Arc<RemoteList<T>>,
    search: Mutex<Debouncer<String>>,
    on_filters_change: Mutex<Option<FiltersObserver>>,
}

impl<T> std::fmt::Debug for ListView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ListView")
            .field("remote", &self.remote)
            .field("page", &state.pager.cursor())
            .field("search", &state.search)
            .field("filters", state.filters.filters())
            .finish()
    }
}

impl<T> ListView<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Mount the view. Issues the first fetch unless `skip` is set.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(client: Arc<QueryClient>, config: ListViewConfig) -> Self {
        let remote = Arc::new(RemoteList::new(
            client,
            config.descriptor,
            FetchOptions {
                policy: config.cache_policy,
                skip: config.skip,
            },
        ));
        let state = Arc::new(Mutex::new(ViewState {
            pager: PaginationController::new(config.initial_page, config.page_size),
            filters: FilterStore::with_defaults(config.default_filters),
            search: config.initial_search,
            extra: config.extra_variables,
            dispatched: None,
        }));

        let search = Debouncer::new(config.search_debounce, {
            let state = Arc::clone(&state);
            let remote = Arc::clone(&remote);
            move |text: String| {
                let mut state = state.lock();
                state.search = text;
                sync(&mut state, &remote);
            }
        });

        let view = Self {
            state,
            remote,
            search: Mutex::new(search),
            on_filters_change: Mutex::new(None),
        };
        view.with_state(|_| {});
        view
    }

    /// Mutate state, then recompose and maybe dispatch.
    fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        sync(&mut state, &self.remote);
        result
    }

    /// Apply a filter operation, then notify the observer with the committed
    /// map. The observer runs with no view lock held and may read the view.
    fn with_filters(&self, f: impl FnOnce(&mut FilterStore)) {
        let committed = self.with_state(|state| {
            f(&mut state.filters);
            state.filters.filters().clone()
        });
        let observer = self.on_filters_change.lock().clone();
        if let Some(observer) = observer {
            observer(&committed);
        }
    }

    pub fn descriptor(&self) -> &ListQueryDescriptor {
        self.remote.descriptor()
    }

    // Observation

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.remote.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.remote.subscribe()
    }

    pub fn items(&self) -> Vec<T> {
        self.remote.snapshot().items
    }

    pub fn meta(&self) -> Option<PaginationMeta> {
        self.remote.snapshot().meta
    }

    pub fn loading(&self) -> bool {
        self.remote.snapshot().loading
    }

    pub fn error(&self) -> Option<Arc<RosterError>> {
        self.remote.snapshot().error
    }

    pub fn has_next_page(&self) -> bool {
        self.meta().is_some_and(|meta| meta.has_next_page)
    }

    pub fn has_previous_page(&self) -> bool {
        self.meta().is_some_and(|meta| meta.has_previous_page)
    }

    pub fn current_page(&self) -> u32 {
        self.state.lock().pager.current_page()
    }

    pub fn page_size(&self) -> u32 {
        self.state.lock().pager.page_size()
    }

    /// Variables the next fetch would use.
    pub fn variables(&self) -> QueryVariables {
        self.state.lock().variables()
    }

    pub fn search(&self) -> String {
        self.state.lock().search.clone()
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.lock().is_pending()
    }

    pub fn filters(&self) -> FilterMap {
        self.state.lock().filters.filters().clone()
    }

    pub fn active_filters_count(&self) -> usize {
        self.state.lock().filters.active_filters_count()
    }

    /// Wait for a pending search to settle and the resulting fetch to finish.
    pub async fn settled(&self) {
        let mut idle = self.search.lock().idle_receiver();
        let _ = idle.wait_for(|idle| *idle).await;
        self.remote.settled().await;
    }

    // Search and filters

    /// Debounced: only the last text within the quiet period is fetched.
    pub fn set_search(&self, text: impl Into<String>) {
        self.search.lock().push(text.into());
    }

    pub fn set_filter(&self, key: impl Into<String>, value: Option<FilterValue>) -> Result<()> {
        let key = key.into();
        self.remote.descriptor().check_filter(&key)?;
        self.with_filters(|filters| filters.set_filter(key, value));
        Ok(())
    }

    pub fn clear_filter(&self, key: &str) {
        self.with_filters(|filters| filters.clear_filter(key));
    }

    pub fn clear_all_filters(&self) {
        self.with_filters(FilterStore::clear_all_filters);
    }

    /// Called with the full filter map after every filter operation.
    pub fn on_filters_change(&self, observer: impl Fn(&FilterMap) + Send + Sync + 'static) {
        *self.on_filters_change.lock() = Some(Arc::new(observer));
    }

    /// `None` removes the variable.
    pub fn set_extra_variable(&self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        self.with_state(|state| match value {
            Some(value) => {
                state.extra.insert(key, value);
            }
            None => {
                state.extra.remove(&key);
            }
        });
    }

    // Pagination

    /// Returns whether the page moved.
    pub fn go_to_next_page(&self) -> bool {
        let meta = self.meta();
        self.with_state(|state| state.pager.go_to_next_page(meta.as_ref()))
    }

    pub fn go_to_previous_page(&self) -> bool {
        let meta = self.meta();
        self.with_state(|state| state.pager.go_to_previous_page(meta.as_ref()))
    }

    pub fn reset_page(&self) -> bool {
        self.with_state(|state| state.pager.reset_page())
    }

    pub fn set_page_size(&self, page_size: u32) -> bool {
        self.with_state(|state| state.pager.set_page_size(page_size))
    }

    /// Re-issue the last variables against the network. No page reset.
    pub fn refetch(&self) -> bool {
        self.remote.refetch()
    }
}
