use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::record::Record;

/// Current free-text search of a list view. An empty search matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_string: String,
}

impl FilterState {
    pub fn new(search_string: impl Into<String>) -> Self {
        FilterState {
            search_string: search_string.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search_string.is_empty()
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-sensitive substring match
    #[default]
    Substring,
    /// The whole field text must equal the search
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
    pub key: String,
    #[serde(default)]
    pub mode: MatchMode,
}

impl SearchField {
    pub fn substring(key: impl Into<String>) -> Self {
        SearchField {
            key: key.into(),
            mode: MatchMode::Substring,
        }
    }

    pub fn exact(key: impl Into<String>) -> Self {
        SearchField {
            key: key.into(),
            mode: MatchMode::Exact,
        }
    }

    fn matches<R: Record>(&self, record: &R, search: &str) -> bool {
        // missing or null fields never match
        let Some(text) = record.field(&self.key).and_then(|v| v.search_text()) else {
            return false;
        };

        match self.mode {
            MatchMode::Substring => text.contains(search),
            MatchMode::Exact => text == search,
        }
    }
}

/// The fields a list view searches. Each key appears at most once; adding
/// a key again replaces its match mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchFields {
    fields: Vec<SearchField>,
}

impl SearchFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: SearchField) -> Self {
        self.insert(field);
        self
    }

    pub fn insert(&mut self, field: SearchField) {
        match self.fields.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => existing.mode = field.mode,
            None => self.fields.push(field),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Collapses duplicate keys; the last definition of a key wins.
    pub fn dedup(self) -> Self {
        self.fields
            .into_iter()
            .fold(SearchFields::new(), |acc, f| acc.with(f))
    }
}

impl FromIterator<SearchField> for SearchFields {
    fn from_iter<T: IntoIterator<Item = SearchField>>(iter: T) -> Self {
        iter.into_iter()
            .fold(SearchFields::new(), |acc, f| acc.with(f))
    }
}

/// Defines the behavior of a filter.
pub trait Filter<R: Record>: Debug {
    fn matches(&self, record: &R) -> bool;
}

/// Free-text search over a set of fields, plus an exact match on `id`.
#[derive(Debug, Clone, Copy)]
pub struct SearchFilter<'s> {
    search: &'s str,
    fields: &'s SearchFields,
}

impl<'s> SearchFilter<'s> {
    pub fn new(search: &'s str, fields: &'s SearchFields) -> Self {
        SearchFilter { search, fields }
    }
}

impl<R: Record> Filter<R> for SearchFilter<'_> {
    fn matches(&self, record: &R) -> bool {
        if self.search.is_empty() {
            return true;
        }

        record.id() == self.search || self.fields.iter().any(|f| f.matches(record, self.search))
    }
}

/// Retains the records matching `filter`, in input order.
pub fn apply<'a, R, I, F>(records: I, filter: &F) -> Vec<&'a R>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
    F: Filter<R> + ?Sized,
{
    records.into_iter().filter(|r| filter.matches(*r)).collect()
}

/// Narrows `records` to those matching `search_string` in any of `fields`,
/// or whose id is exactly `search_string`.
pub fn filter<'a, R, I>(records: I, search_string: &str, fields: &SearchFields) -> Vec<&'a R>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    apply(records, &SearchFilter::new(search_string, fields))
}
