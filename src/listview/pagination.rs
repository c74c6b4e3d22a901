//! Page cursor and navigation.
//!
//! The controller never decides on its own whether another page exists; it
//! only moves when the last response said it may.

use serde::{Deserialize, Serialize};

use super::variables::QueryShape;

/// Default page size when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default initial page.
pub const DEFAULT_INITIAL_PAGE: u32 = 1;

/// Pagination metadata reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Whether the navigation flags agree with page/total_pages.
    pub fn is_consistent(&self) -> bool {
        self.has_next_page == (self.page < self.total_pages)
            && self.has_previous_page == (self.page > 1)
    }
}

/// Current page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub current_page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    initial_page: u32,
    cursor: PageCursor,
    last_shape: Option<QueryShape>,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_PAGE, DEFAULT_PAGE_SIZE)
    }
}

impl PaginationController {
    /// Zero values are raised to 1.
    pub fn new(initial_page: u32, page_size: u32) -> Self {
        let initial_page = initial_page.max(1);
        Self {
            initial_page,
            cursor: PageCursor {
                current_page: initial_page,
                page_size: page_size.max(1),
            },
            last_shape: None,
        }
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn current_page(&self) -> u32 {
        self.cursor.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.cursor.page_size
    }

    pub fn initial_page(&self) -> u32 {
        self.initial_page
    }

    /// Advance one page if the server reported one. Returns whether it moved.
    pub fn go_to_next_page(&mut self, meta: Option<&PaginationMeta>) -> bool {
        match meta {
            Some(meta) if meta.has_next_page => {
                self.cursor.current_page = self.cursor.current_page.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    /// Step back one page if the server reported one. Never goes below 1.
    pub fn go_to_previous_page(&mut self, meta: Option<&PaginationMeta>) -> bool {
        match meta {
            Some(meta) if meta.has_previous_page && self.cursor.current_page > 1 => {
                self.cursor.current_page -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn reset_page(&mut self) -> bool {
        if self.cursor.current_page == self.initial_page {
            return false;
        }
        self.cursor.current_page = self.initial_page;
        true
    }

    /// Change the page size. Always lands on the initial page.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let page_size = page_size.max(1);
        if page_size == self.cursor.page_size {
            return false;
        }
        self.cursor.page_size = page_size;
        self.cursor.current_page = self.initial_page;
        true
    }

    /// Record the query shape about to be fetched.
    ///
    /// When it differs from the last observed shape and we are off the initial
    /// page, the cursor goes back to the initial page. Returns whether a reset
    /// happened. The first observation never resets.
    pub fn observe_shape(&mut self, shape: &QueryShape) -> bool {
        let changed = self
            .last_shape
            .as_ref()
            .is_some_and(|previous| previous != shape);
        self.last_shape = Some(shape.clone());

        if changed && self.cursor.current_page != self.initial_page {
            self.cursor.current_page = self.initial_page;
            return true;
        }
        false
    }
}
