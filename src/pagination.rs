//! Page slicing for list views.
//!
//! `PaginationState` keeps `offset == page * first` through every
//! transition, so callers never have to recompute one from the others.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::ListSiftError;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPagination")]
pub struct PaginationState {
    page: usize,
    first: usize,
    offset: usize,
}

#[derive(Deserialize)]
struct RawPagination {
    #[serde(default)]
    page: usize,
    first: usize,
}

impl TryFrom<RawPagination> for PaginationState {
    type Error = ListSiftError;

    fn try_from(raw: RawPagination) -> Result<Self, Self::Error> {
        PaginationState::new(raw.page, raw.first)
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState {
            page: 0,
            first: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl PaginationState {
    /// A `page` whose offset would overflow is clamped to the last
    /// representable page.
    pub fn new(page: usize, first: usize) -> Result<Self, ListSiftError> {
        if first == 0 {
            return Err(ListSiftError::InvalidPageSize(first));
        }

        let page = page.min(usize::MAX / first);
        Ok(PaginationState {
            page,
            first,
            offset: page * first,
        })
    }

    /// First page with the given page size.
    pub fn with_first(first: usize) -> Result<Self, ListSiftError> {
        Self::new(0, first)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Page size.
    pub fn first(&self) -> usize {
        self.first
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Back to the first page, keeping the page size. Used whenever the
    /// search text changes.
    pub fn reset(&self) -> Self {
        PaginationState {
            page: 0,
            first: self.first,
            offset: 0,
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        let page = page.min(usize::MAX / self.first);
        PaginationState {
            page,
            first: self.first,
            offset: page * self.first,
        }
    }

    /// Changes the page size, landing on the page that contains the row
    /// currently at the top.
    pub fn with_page_size(&self, first: usize) -> Result<Self, ListSiftError> {
        let page = self.offset / first.max(1);
        let next = Self::new(page, first)?;
        trace!(
            "Page size {} -> {}: page {} -> {}",
            self.first,
            next.first,
            self.page,
            next.page
        );
        Ok(next)
    }

    /// Half-open row range of this page within `total` rows.
    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(total);
        let end = self.offset.saturating_add(self.first).min(total);
        start..end
    }
}

/// Number of pages needed to show `total` rows, `first` at a time.
pub fn page_count(total: usize, first: usize) -> usize {
    total.div_ceil(first.max(1))
}

/// The rows of `records` on the page `state` points at. An offset past the
/// end gives an empty page.
pub fn paginate<'r, T>(records: &'r [T], state: &PaginationState) -> &'r [T] {
    &records[state.range(records.len())]
}

/// One rendered page plus the numbers a pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: usize,
    pub first: usize,
    pub offset: usize,
    /// Length of the filtered sequence before slicing.
    pub total: usize,
}

impl<T> Page<T> {
    pub fn from_rows(rows: Vec<T>, state: &PaginationState, total: usize) -> Self {
        Page {
            rows,
            page: state.page(),
            first: state.first(),
            offset: state.offset(),
            total,
        }
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total, self.first)
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}
