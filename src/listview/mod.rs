//! Backend-paginated, filtered, debounced list views.
//!
//! The pieces compose bottom-up:
//!
//! - [`debounce`]: trailing-edge debouncer for search input
//! - [`filters`]: named filter values and their query-ready subset
//! - [`variables`]: order-independent query variables and query shape
//! - [`pagination`]: page cursor gated on server-reported flags
//! - [`remote`]: executes a list operation and publishes snapshots
//! - [`view`]: the orchestrator every list page uses

pub mod debounce;
pub mod filters;
pub mod pagination;
pub mod remote;
pub mod variables;
pub mod view;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use filters::{FilterMap, FilterStore, FilterValue, parse_filter_arg};
pub use pagination::{PageCursor, PaginationController, PaginationMeta};
pub use remote::{
    FetchOptions, ListPage, ListPhase, ListQueryDescriptor, ListSnapshot, RemoteList,
    decode_list,
};
pub use variables::{QueryShape, QueryVariables};
pub use view::{ListView, ListViewConfig};
