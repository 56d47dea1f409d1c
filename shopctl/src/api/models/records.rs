//! Generic entity records.
//!
//! CRUD entities (brands, suppliers, staff, ...) are rendered from a field registry rather than
//! per-entity structs, so records stay as loosely-typed JSON objects.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::RecordId;

/// One entity record as returned by the shop API.
pub type Record = Map<String, Value>;

/// `GET /api/{entity}/{id}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse {
    #[serde(alias = "data")]
    pub item: Record,
}

/// Payload of create/update/delete calls. Only the optional message is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "data")]
    pub item: Option<Record>,
}

/// Id of a record, if it carries a usable one.
pub fn record_id(record: &Record) -> Option<RecordId> {
    record
        .get("id")
        .and_then(|v| serde_json::from_value::<RecordId>(v.clone()).ok())
        .filter(|id| !id.as_str().is_empty())
}

/// Text of a string/number field, empty when missing.
pub fn record_text(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
