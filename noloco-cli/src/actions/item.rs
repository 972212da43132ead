//! Workflow items flowing in and out of actions

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::query::Record;

/// One incoming workflow item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub json: Record,
}

impl InputItem {
    pub fn new(json: Record) -> Self {
        Self { json }
    }

    /// Items from a JSON value: an array of objects, or a single object
    pub fn from_value(value: Value) -> Vec<Self> {
        match value {
            Value::Array(values) => values.into_iter().filter_map(Self::from_object).collect(),
            other => Self::from_object(other).into_iter().collect(),
        }
    }

    fn from_object(value: Value) -> Option<Self> {
        match value {
            Value::Object(json) => Some(Self { json }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One produced workflow item, paired with the input it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Record,
    pub paired_item: PairedItem,
}

impl OutputItem {
    pub fn new(json: Record, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }

    /// `{"success": true}`, optionally with the affected id
    pub fn success(item: usize, id: Option<&str>) -> Self {
        let mut json = Record::new();
        json.insert("success".to_string(), Value::Bool(true));
        if let Some(id) = id {
            json.insert("id".to_string(), json!(id));
        }
        Self::new(json, item)
    }

    /// `{"error": message}` for a failed item under continue-on-fail
    pub fn error(item: usize, message: impl Into<String>) -> Self {
        let mut json = Record::new();
        json.insert("error".to_string(), Value::String(message.into()));
        Self::new(json, item)
    }

    pub fn is_error(&self) -> bool {
        self.json.contains_key("error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_accepts_array_or_object() {
        let items = InputItem::from_value(json!([{"a": 1}, 3, {"b": 2}]));
        assert_eq!(items.len(), 2);
        assert_eq!(InputItem::from_value(json!({"a": 1})).len(), 1);
        assert!(InputItem::from_value(json!("nope")).is_empty());
    }

    #[test]
    fn test_output_shapes() {
        let ok = OutputItem::success(3, Some("7"));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"json": {"success": true, "id": "7"}, "pairedItem": {"item": 3}})
        );
        assert!(!ok.is_error());
        assert!(OutputItem::error(0, "boom").is_error());
    }
}
