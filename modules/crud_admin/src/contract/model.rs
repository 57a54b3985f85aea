use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Store-assigned identifier, unique within one entity kind.
pub type RecordId = i32;

/// A typed scalar value of one record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Boolean(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Validated field values keyed by field name. Absent optional fields are simply missing.
pub type Record = BTreeMap<String, FieldValue>;

/// A persisted record: its identifier plus field values.
/// Serializes flat, e.g. `{"id": 1, "name": "Alice", "dob": "2000-01-01"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub values: Record,
}

impl StoredRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }
}
