//! Common type definitions.
//!
//! The shop API is inconsistent about identifiers: most tables use integer keys, a few use
//! string codes. [`RecordId`] accepts either and keeps the textual form, which is all the console
//! ever needs (ids only travel back into URLs and request bodies).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of any shop API record, kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// JSON form for request bodies: a number when the id is numeric, otherwise a string.
    pub fn to_json(&self) -> serde_json::Value {
        self.0
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::String(self.0.clone()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => RecordId(n.to_string()),
            Raw::Str(s) => RecordId(s),
        })
    }
}
