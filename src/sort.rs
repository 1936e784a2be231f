//! Record sorting for list views.
//!
//! Values are mapped to a sort key once per record, then ordered with a
//! stable sort:
//! - strings with a numeric prefix compare as numbers ("2" < "10")
//! - other strings compare by their uppercase form ("Apple" < "banana")
//! - missing and null values always sort last, in either direction
//! - a column mixing kinds orders them by rank: bool, number, text, object

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::record::Record;
use crate::value::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    pub key: String,
    #[serde(default)]
    pub is_desc: bool,
}

impl SortRule {
    pub fn new(key: impl Into<String>, is_desc: bool) -> Self {
        SortRule {
            key: key.into(),
            is_desc,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, false)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, true)
    }

    pub fn direction(&self) -> SortDirection {
        match self.is_desc {
            true => SortDirection::Desc,
            false => SortDirection::Asc,
        }
    }

    /// The rule produced by clicking the header of column `key`: the active
    /// column flips direction, any other column starts ascending.
    pub fn toggled(&self, key: &str) -> Self {
        if self.key == key {
            Self::new(key, !self.is_desc)
        } else {
            Self::asc(key)
        }
    }
}

/// Comparable form of a field value. Variant order is the cross-kind rank.
#[derive(Debug, Clone)]
enum SortKey {
    Bool(bool),
    Number(f64),
    Text(String),
    Object(String),
}

impl SortKey {
    fn of(value: Option<&FieldValue>) -> Option<Self> {
        match value? {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(SortKey::Bool(*b)),
            FieldValue::Number(n) => Some(SortKey::Number(*n)),
            FieldValue::String(s) => Some(match parse_leading_number(s) {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(s.to_uppercase()),
            }),
            object @ FieldValue::Object(_) => Some(SortKey::Object(object.to_json().to_string())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Object(_) => 3,
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => compare_numbers(*a, *b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Object(a), SortKey::Object(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// NaN equals NaN and sorts above every other number; -0 equals 0.
fn compare_numbers(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ordering) => ordering,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

/// Parses the longest decimal prefix of `s`, ignoring leading whitespace.
///
/// Accepts an optional sign, then either `Infinity` or digits with an
/// optional fraction and exponent. Returns `None` when no digits lead the
/// string, so "12 boxes" is 12 and "box 12" is text.
pub fn parse_leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn compare_keys(a: Option<&SortKey>, b: Option<&SortKey>, is_desc: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match is_desc {
            true => b.cmp(a),
            false => a.cmp(b),
        },
    }
}

/// Returns `records` ordered by `rule`. The input is never reordered; the
/// result borrows from it.
pub fn sort<'a, R, I>(records: I, rule: &SortRule) -> Vec<&'a R>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut keyed: Vec<(Option<SortKey>, &'a R)> = records
        .into_iter()
        .map(|record| (SortKey::of(record.field(&rule.key)), record))
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), rule.is_desc));

    keyed.into_iter().map(|(_, record)| record).collect()
}
