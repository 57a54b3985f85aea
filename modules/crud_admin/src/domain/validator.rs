use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::contract::model::{FieldValue, Record};
use crate::domain::shape::{FieldKind, ShapeDescriptor};

/// Untyped submitted form fields: name → raw string value.
pub type RawFields = HashMap<String, String>;

pub const FIELD_REQUIRED: &str = "field required";
pub const INVALID_DATE: &str = "invalid date";
pub const INVALID_BOOLEAN: &str = "invalid boolean";

/// First field (in shape order) that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|dt| dt.date())
    })
}

/// Checkbox semantics; `None` for anything unrecognized.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Convert raw form fields into a typed record for `shape`.
///
/// All-or-nothing: the first failing field (in shape order) is reported and no
/// record is produced. Fields not declared by the shape are ignored.
pub fn validate(raw: &RawFields, shape: &ShapeDescriptor) -> Result<Record, ValidationError> {
    let mut record = Record::new();

    for field in &shape.fields {
        let submitted = raw.get(&field.name).map(String::as_str);

        let value = match field.kind {
            FieldKind::Boolean => {
                let flag = match submitted {
                    None => false,
                    Some(s) => parse_bool(s)
                        .ok_or_else(|| ValidationError::new(&field.name, INVALID_BOOLEAN))?,
                };
                Some(FieldValue::Boolean(flag))
            }
            FieldKind::Text => match submitted {
                Some(s) if !s.trim().is_empty() => Some(FieldValue::Text(s.to_string())),
                _ if field.required => {
                    return Err(ValidationError::new(&field.name, FIELD_REQUIRED))
                }
                _ => None,
            },
            FieldKind::Date => match submitted {
                Some(s) if !s.trim().is_empty() => Some(FieldValue::Date(
                    parse_date(s).ok_or_else(|| ValidationError::new(&field.name, INVALID_DATE))?,
                )),
                _ if field.required => {
                    return Err(ValidationError::new(&field.name, FIELD_REQUIRED))
                }
                _ => None,
            },
        };

        if let Some(v) = value {
            record.insert(field.name.clone(), v);
        }
    }

    Ok(record)
}
