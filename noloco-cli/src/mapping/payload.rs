//! Mapped values to write payload
//!
//! Mapping columns for composite sub-fields are flat (`address__city`), while
//! the data endpoint expects them nested under their parent field.

use serde_json::{Map, Value};

use super::columns::ColumnId;
use crate::api::query::Record;

/// Build the write payload from values keyed by column id
///
/// Keys containing the sub-field separator are split at its first occurrence
/// and nested under the parent. Null values are dropped, so an all-null input
/// yields an empty payload.
pub fn to_payload(values: &Record) -> Record {
    let mut payload = Record::new();

    for (key, value) in values {
        if value.is_null() {
            continue;
        }

        match ColumnId::from_wire(key) {
            ColumnId::SubField { parent, child } => {
                let slot = payload
                    .entry(parent.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    log::warn!("'{}' replaced by its sub-field values", parent);
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(nested) = slot {
                    nested.insert(child, value.clone());
                }
            }
            _ => {
                if payload.get(key).is_some_and(Value::is_object) && !value.is_object() {
                    log::warn!("'{}' already holds sub-field values, plain value ignored", key);
                    continue;
                }
                payload.insert(key.clone(), value.clone());
            }
        }
    }

    payload
}
