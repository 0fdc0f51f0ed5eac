//! Note collection codec.
//!
//! # Responsibility
//! - Decode collections from cache, remote snapshot and import files with
//!   one shared shape check.
//! - Encode collections compactly (cache) or pretty-printed (export, gist).
//!
//! # Invariants
//! - Only a JSON array of note records is accepted; any other JSON value is
//!   a `FormatError`, never an empty collection.
//! - Pretty output uses 2-space indentation.

use crate::model::note::Note;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Payload is not the expected array-of-notes shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Text is not JSON at all.
    InvalidJson(String),
    /// Valid JSON, but the top-level value is not an array.
    NotAnArray(&'static str),
    /// An array whose elements are not note records.
    InvalidRecord(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(details) => write!(f, "invalid JSON: {details}"),
            Self::NotAnArray(kind) => write!(f, "invalid format: expected array, got {kind}"),
            Self::InvalidRecord(details) => write!(f, "invalid note record: {details}"),
        }
    }
}

impl Error for FormatError {}

/// Decodes a note collection from JSON text.
pub fn decode_collection(text: &str) -> Result<Vec<Note>, FormatError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| FormatError::InvalidJson(err.to_string()))?;
    decode_collection_value(value)
}

/// Decodes a note collection from an already-parsed JSON value.
pub fn decode_collection_value(value: Value) -> Result<Vec<Note>, FormatError> {
    if !value.is_array() {
        return Err(FormatError::NotAnArray(json_kind(&value)));
    }
    serde_json::from_value(value).map_err(|err| FormatError::InvalidRecord(err.to_string()))
}

/// Compact encoding used for the local cache slot.
pub fn encode_collection(notes: &[Note]) -> String {
    serde_json::to_string(notes).unwrap_or_else(|_| "[]".to_string())
}

/// Pretty encoding (2-space indentation) used for export files.
pub fn encode_collection_pretty(notes: &[Note]) -> String {
    serde_json::to_string_pretty(notes).unwrap_or_else(|_| "[]".to_string())
}

/// Names the top-level JSON type for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
