use std::collections::BTreeMap;
use std::io::Read;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ListSiftError;
use crate::value::FieldValue;

/// A row shown by a list view. The engines only ever hold references to
/// records, so implementors are free to keep their own representation.
pub trait Record {
    fn id(&self) -> &str;

    fn field(&self, key: &str) -> Option<&FieldValue>;
}

/// Map-backed record, as produced by decoding a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, FieldValue>",
    into = "BTreeMap<String, FieldValue>"
)]
pub struct DynRecord {
    id: String,
    fields: BTreeMap<String, FieldValue>,
}

impl DynRecord {
    pub const ID_FIELD: &'static str = "id";

    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut fields = BTreeMap::new();
        fields.insert(Self::ID_FIELD.to_owned(), FieldValue::String(id.clone()));
        DynRecord { id, fields }
    }

    /// Builder-style insert, used mostly by tests and fixtures.
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a field. Writing `id` is ignored; a record keeps its identity.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        if key == Self::ID_FIELD {
            return;
        }
        self.fields.insert(key.to_owned(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }
}

impl Record for DynRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

impl TryFrom<BTreeMap<String, FieldValue>> for DynRecord {
    type Error = ListSiftError;

    fn try_from(fields: BTreeMap<String, FieldValue>) -> Result<Self, Self::Error> {
        let id = match fields.get(Self::ID_FIELD) {
            Some(FieldValue::String(s)) => s.clone(),
            Some(value @ FieldValue::Number(_)) => value.to_string(),
            _ => return Err(ListSiftError::MissingId),
        };

        Ok(DynRecord { id, fields })
    }
}

impl From<DynRecord> for BTreeMap<String, FieldValue> {
    fn from(record: DynRecord) -> Self {
        record.fields
    }
}

/// Decodes a JSON array of objects into records.
pub fn load_records<Rd: Read>(reader: Rd) -> Result<Vec<DynRecord>, ListSiftError> {
    let records: Vec<DynRecord> = serde_json::from_reader(reader)?;
    debug!("Loaded {} records", records.len());
    Ok(records)
}
