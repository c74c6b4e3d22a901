pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod crm;
pub mod display;
pub mod error;
pub mod listview;

#[cfg(test)]
pub(crate) mod test_guards;

pub use client::{CachePolicy, QueryClient};
pub use config::Config;
pub use error::{Result, RosterError};
pub use listview::{
    Debouncer, FilterStore, FilterValue, ListQueryDescriptor, ListSnapshot, ListView,
    ListViewConfig, PaginationController, PaginationMeta, RemoteList,
};
