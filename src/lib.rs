//! Sorting, filtering and pagination for tabular list views over
//! in-memory records.
//!
//! Records flow through three pure stages: [`filter::filter`] narrows them
//! by free-text search, [`sort::sort`] orders them, and
//! [`pagination::paginate`] slices out the visible page. [`view::ListView`]
//! holds the state that drives those stages for one view.

pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod preferences;
pub mod record;
pub mod sort;
pub mod value;
pub mod view;

pub use config::{Config, ListViewConfig};
pub use context::AppContext;
pub use error::ListSiftError;
pub use filter::{FilterState, MatchMode, SearchField, SearchFields};
pub use pagination::{Page, PaginationState};
pub use record::{DynRecord, Record};
pub use sort::{SortDirection, SortRule};
pub use value::FieldValue;
pub use view::{ListView, ListViewAction, ListViewState};
