use std::time::Instant;

use log::{debug, warn, Level};
use logging_timer::timer;
use serde::{Deserialize, Serialize};

use crate::config::ListViewConfig;
use crate::debounce::Debouncer;
use crate::error::ListSiftError;
use crate::filter::{self, FilterState, SearchFields};
use crate::pagination::{self, Page, PaginationState};
use crate::record::Record;
use crate::sort::{self, SortRule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListViewAction {
    /// Replace the sort rule
    Sort(SortRule),
    /// Column header click on `key`
    SortBy(String),
    FilterChange(String),
    PageChange(usize),
    PageSizeChange(usize),
}

/// Everything a list view remembers between renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListViewState {
    pub sort: SortRule,
    pub filter: FilterState,
    pub pagination: PaginationState,
}

impl ListViewState {
    pub fn new(sort: SortRule, pagination: PaginationState) -> Self {
        ListViewState {
            sort,
            filter: FilterState::default(),
            pagination,
        }
    }

    pub fn from_config(config: &ListViewConfig) -> Result<Self, ListSiftError> {
        Ok(Self::new(
            config.initial_sort_by.clone(),
            PaginationState::with_first(config.page_size)?,
        ))
    }

    /// Next state after `action`. A zero page size leaves the state as is.
    pub fn reduce(&self, action: ListViewAction) -> Self {
        let mut next = self.clone();

        match action {
            ListViewAction::Sort(rule) => next.sort = rule,
            ListViewAction::SortBy(key) => next.sort = self.sort.toggled(&key),
            ListViewAction::FilterChange(search_string) => {
                next.filter = FilterState::new(search_string);
                next.pagination = self.pagination.reset();
            }
            ListViewAction::PageChange(page) => next.pagination = self.pagination.with_page(page),
            ListViewAction::PageSizeChange(first) => match self.pagination.with_page_size(first) {
                Ok(pagination) => next.pagination = pagination,
                Err(e) => warn!("Ignoring page size change: {}", e),
            },
        }

        next
    }
}

/// A list view instance: its state, the fields it searches and the
/// debounced search box feeding it. Records are borrowed per render.
#[derive(Debug, Clone)]
pub struct ListView {
    state: ListViewState,
    search_fields: SearchFields,
    search_input: String,
    debouncer: Debouncer<String>,
}

impl ListView {
    pub fn new(config: &ListViewConfig) -> Result<Self, ListSiftError> {
        Ok(ListView {
            state: ListViewState::from_config(config)?,
            search_fields: config.search_fields.clone(),
            search_input: String::new(),
            debouncer: Debouncer::new(config.debounce()),
        })
    }

    pub fn state(&self) -> &ListViewState {
        &self.state
    }

    pub fn search_fields(&self) -> &SearchFields {
        &self.search_fields
    }

    /// Text currently in the search box, which may not be applied yet.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn dispatch(&mut self, action: ListViewAction) {
        debug!("ListView action: {:?}", action);
        self.state = self.state.reduce(action);
    }

    /// Records a keystroke in the search box. The filter changes only once
    /// input has been quiet for the debounce time; see [`ListView::tick`].
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search_input = text.into();
        self.debouncer.push(self.search_input.clone(), now);
    }

    /// Applies settled search input. Returns whether the filter changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(search) => self.apply_search(search),
            None => false,
        }
    }

    /// Applies pending search input without waiting for the debounce time.
    pub fn flush_search(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(search) => self.apply_search(search),
            None => false,
        }
    }

    fn apply_search(&mut self, search: String) -> bool {
        if search == self.state.filter.search_string {
            return false;
        }
        self.dispatch(ListViewAction::FilterChange(search));
        true
    }

    /// Runs filter, sort and pagination over `records`.
    pub fn page<'a, R: Record>(&self, records: &'a [R]) -> Page<&'a R> {
        let _tmr = timer!(Level::Trace; "ListView::page", "{} records", records.len());

        let filtered = filter::filter(
            records,
            &self.state.filter.search_string,
            &self.search_fields,
        );
        let sorted = sort::sort(filtered, &self.state.sort);
        let rows = pagination::paginate(&sorted, &self.state.pagination).to_vec();

        Page::from_rows(rows, &self.state.pagination, sorted.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SearchField;
    use crate::record::DynRecord;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn stock_lines(n: usize) -> Vec<DynRecord> {
        (0..n)
            .map(|i| {
                let name = if i % 50 == 7 { "Vaccine carrier" } else { "Syringe" };
                DynRecord::new(format!("line-{i}"))
                    .with("itemName", name)
                    .with("packSize", (n - i) as i64)
            })
            .collect()
    }

    fn config() -> ListViewConfig {
        ListViewConfig {
            initial_sort_by: SortRule::asc("packSize"),
            search_fields: SearchFields::new().with(SearchField::substring("itemName")),
            ..ListViewConfig::default()
        }
    }

    fn ids<R: Record>(page: &Page<&R>) -> Vec<String> {
        page.rows.iter().map(|r| r.id().to_owned()).collect()
    }

    #[test]
    fn test_initial_state_from_config() {
        let view = ListView::new(&config()).unwrap();
        let state = view.state();
        assert_eq!(state.sort, SortRule::asc("packSize"));
        assert!(state.filter.is_empty());
        assert_eq!(state.pagination, PaginationState::with_first(100).unwrap());

        let bad = ListViewConfig {
            page_size: 0,
            ..ListViewConfig::default()
        };
        assert!(ListView::new(&bad).is_err());
    }

    #[test]
    fn test_filter_change_resets_pagination() {
        let records = stock_lines(250);
        let mut view = ListView::new(&config()).unwrap();

        view.dispatch(ListViewAction::PageChange(2));
        assert_eq!(view.page(&records).rows.len(), 50);

        view.dispatch(ListViewAction::FilterChange("Vaccine".into()));
        let state = view.state().pagination;
        assert_eq!((state.page(), state.first(), state.offset()), (0, 100, 0));

        let page = view.page(&records);
        assert_eq!(page.total, 5);
        assert_eq!(page.rows.len(), 5);
        // ascending packSize: later lines have smaller packs
        assert_eq!(
            ids(&page),
            vec!["line-207", "line-157", "line-107", "line-57", "line-7"]
        );
    }

    #[test]
    fn test_sort_change_keeps_page() {
        let state = ListViewState::from_config(&config())
            .unwrap()
            .reduce(ListViewAction::PageChange(1));

        let sorted = state.reduce(ListViewAction::Sort(SortRule::desc("itemName")));
        assert_eq!(sorted.pagination, state.pagination);
        assert_eq!(sorted.sort, SortRule::desc("itemName"));

        let clicked = sorted.reduce(ListViewAction::SortBy("itemName".into()));
        assert_eq!(clicked.sort, SortRule::asc("itemName"));
        let other = clicked.reduce(ListViewAction::SortBy("packSize".into()));
        assert_eq!(other.sort, SortRule::asc("packSize"));
    }

    #[test]
    fn test_page_size_change() {
        let state = ListViewState::from_config(&config())
            .unwrap()
            .reduce(ListViewAction::PageChange(2));

        let resized = state.reduce(ListViewAction::PageSizeChange(50));
        assert_eq!(resized.pagination.page(), 4);
        assert_eq!(resized.pagination.offset(), 200);

        let ignored = resized.reduce(ListViewAction::PageSizeChange(0));
        assert_eq!(ignored, resized);
    }

    #[test]
    fn test_search_by_id() {
        let records = stock_lines(30);
        let mut view = ListView::new(&config()).unwrap();
        view.dispatch(ListViewAction::FilterChange("line-12".into()));

        let page = view.page(&records);
        assert_eq!(ids(&page), vec!["line-12"]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_debounced_search() {
        let records = stock_lines(60);
        let mut view = ListView::new(&config()).unwrap();
        let start = Instant::now();

        view.dispatch(ListViewAction::PageChange(1));
        view.on_search_input("Vac", start);
        view.on_search_input("Vacc", start + Duration::from_millis(100));
        assert_eq!(view.search_input(), "Vacc");

        // still typing: nothing applied yet
        assert!(!view.tick(start + Duration::from_millis(300)));
        assert!(view.state().filter.is_empty());
        assert_eq!(view.state().pagination.page(), 1);

        assert!(view.tick(start + Duration::from_millis(400)));
        assert_eq!(view.state().filter.search_string, "Vacc");
        assert_eq!(view.state().pagination.page(), 0);
        assert_eq!(view.page(&records).total, 2);
    }

    #[test]
    fn test_flush_search_skips_unchanged_text() {
        let mut view = ListView::new(&config()).unwrap();
        let now = Instant::now();

        view.on_search_input("Syr", now);
        assert!(view.flush_search());
        assert!(!view.flush_search());

        view.dispatch(ListViewAction::PageChange(3));
        view.on_search_input("Syr", now);
        assert!(!view.flush_search());
        assert_eq!(view.state().pagination.page(), 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let records = stock_lines(10);
        let mut view = ListView::new(&config()).unwrap();
        view.dispatch(ListViewAction::PageChange(4));

        let page = view.page(&records);
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 10);
        assert_eq!(page.page_count(), 1);
    }

    #[test]
    fn test_records_are_not_reordered() {
        let records = stock_lines(5);
        let view = ListView::new(&config()).unwrap();
        let page = view.page(&records);
        assert_eq!(ids(&page), vec!["line-4", "line-3", "line-2", "line-1", "line-0"]);
        assert_eq!(records[0].id(), "line-0");
    }
}
