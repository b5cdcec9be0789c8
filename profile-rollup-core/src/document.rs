//! Aggregate documents and the append-only merge
//!
//! Wire format: `{"profiles": [record, ...]}` as compact UTF-8 JSON. Records
//! already in the store are held as raw JSON values so that a read-merge-write
//! cycle never rewrites them; only the appended record goes through
//! [`ProfileRecord`] serialization.

use crate::record::ProfileRecord;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

const PROFILES_FIELD: &str = "profiles";

/// Why a document could not be read or written
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Stored bytes are not valid JSON
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Valid JSON, wrong shape
    #[error("unexpected document shape: {0}")]
    Shape(String),

    /// Refusing to persist a document without records
    #[error("document has no records")]
    Empty,

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The persisted per-day, per-kind document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateDocument {
    profiles: Vec<Value>,
    /// Top-level fields other than `profiles`, carried through untouched
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl AggregateDocument {
    /// A fresh document holding exactly `record`
    pub fn single(record: &ProfileRecord) -> Result<Self, DocumentError> {
        Ok(Self {
            profiles: vec![serde_json::to_value(record).map_err(DocumentError::Encode)?],
            extra: Map::new(),
        })
    }

    /// Parse stored bytes
    ///
    /// The root must be an object with a `profiles` array whose entries are
    /// objects.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let root: Value = serde_json::from_slice(bytes).map_err(DocumentError::Malformed)?;
        let Value::Object(mut extra) = root else {
            return Err(DocumentError::Shape(format!(
                "expected a JSON object, found {}",
                json_type(&root)
            )));
        };

        let profiles = match extra.shift_remove(PROFILES_FIELD) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(DocumentError::Shape(format!(
                    "'{PROFILES_FIELD}' must be an array, found {}",
                    json_type(&other)
                )))
            }
            None => {
                return Err(DocumentError::Shape(format!(
                    "missing '{PROFILES_FIELD}' array"
                )))
            }
        };

        if let Some((idx, item)) = profiles.iter().enumerate().find(|(_, v)| !v.is_object()) {
            return Err(DocumentError::Shape(format!(
                "record {idx} must be an object, found {}",
                json_type(item)
            )));
        }

        Ok(Self { profiles, extra })
    }

    /// Append `record` after every existing record
    pub fn append(&mut self, record: &ProfileRecord) -> Result<(), DocumentError> {
        let value = serde_json::to_value(record).map_err(DocumentError::Encode)?;
        self.profiles.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Records in append order, as stored
    pub fn records(&self) -> &[Value] {
        &self.profiles
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Decode every record into a [`ProfileRecord`]
    pub fn decode_records(&self) -> Result<Vec<ProfileRecord>, DocumentError> {
        self.profiles
            .iter()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| DocumentError::Shape(format!("unrecognized record: {e}")))
            })
            .collect()
    }

    /// Canonical serialized form
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        if self.profiles.is_empty() {
            return Err(DocumentError::Empty);
        }
        serde_json::to_vec(self).map_err(DocumentError::Encode)
    }
}

/// Merge `record` into the previously stored document, if any
///
/// Without prior bytes the result holds exactly `record`. With prior bytes the
/// document is parsed and `record` is appended last; nothing else changes.
/// Identical records are not deduplicated.
pub fn merge(
    prior: Option<&[u8]>,
    record: &ProfileRecord,
) -> Result<AggregateDocument, DocumentError> {
    match prior {
        None => AggregateDocument::single(record),
        Some(bytes) => {
            let mut document = AggregateDocument::parse(bytes)?;
            document.append(record)?;
            Ok(document)
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
