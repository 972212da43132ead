//! Record page responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as returned by the data endpoints
///
/// Always carries `id`, `uuid` and `createdAt`; every other key is a field
/// api name. Relationship fields keep their natural nested shape.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl RecordPage {
    /// Cursor to continue from, only when the server reports another page
    /// and actually hands out a cursor for it
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.page_info.has_next_page {
            return None;
        }
        self.page_info
            .end_cursor
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Record id as a string, whatever JSON type the server used
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp field of a record
pub fn record_timestamp(record: &Record, field: &str) -> Option<DateTime<Utc>> {
    let raw = record.get(field)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
