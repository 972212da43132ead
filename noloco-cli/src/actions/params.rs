//! Parameter resolution
//!
//! Actions read their configuration one parameter at a time, per input item,
//! through a [`ParameterSource`] supplied by the host.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ActionError;

pub const APP: &str = "app";
pub const TABLE: &str = "dataType";
pub const RECORD_ID: &str = "recordId";
pub const FIELDS: &str = "fields";
pub const RETURN_ALL: &str = "returnAll";
pub const LIMIT: &str = "limit";
pub const ADDITIONAL_OPTIONS: &str = "additionalOptions";
pub const FILTER_MODE: &str = "filterMode";
pub const WHERE: &str = "where";
pub const CUSTOM_QUERY: &str = "customQuery";
pub const SORT: &str = "sort";
pub const FIELD_NAME: &str = "fieldName";

/// Host-side lookup of configured parameter values
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Value of `name` for the item at `item_index`, `None` when unset
    async fn parameter(&self, item_index: usize, name: &str) -> Option<Value>;
}

/// Fixed parameter values with optional per-item overrides
#[derive(Debug, Clone, Default)]
pub struct StaticParameters {
    values: Map<String, Value>,
    per_item: HashMap<usize, Map<String, Value>>,
}

impl StaticParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_item(
        mut self,
        item_index: usize,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.per_item
            .entry(item_index)
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }
}

#[async_trait]
impl ParameterSource for StaticParameters {
    async fn parameter(&self, item_index: usize, name: &str) -> Option<Value> {
        self.per_item
            .get(&item_index)
            .and_then(|values| values.get(name))
            .or_else(|| self.values.get(name))
            .cloned()
    }
}

/// Unwrap a resource locator (`{"mode": "list", "value": ..}`) to its value
pub fn extract_value(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("value") && map.contains_key("mode") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Typed access to a [`ParameterSource`] for one item
pub struct ItemParameters<'a> {
    source: &'a dyn ParameterSource,
    index: usize,
}

impl<'a> ItemParameters<'a> {
    pub fn new(source: &'a dyn ParameterSource, index: usize) -> Self {
        Self { source, index }
    }

    pub async fn raw(&self, name: &str) -> Option<Value> {
        self.source
            .parameter(self.index, name)
            .await
            .map(extract_value)
            .filter(|v| !v.is_null())
    }

    /// Non-empty string parameter; numbers are accepted and stringified
    pub async fn required_string(&self, name: &str) -> Result<String, ActionError> {
        self.optional_string(name)
            .await?
            .ok_or_else(|| ActionError::MissingParameter(name.to_string()))
    }

    pub async fn optional_string(&self, name: &str) -> Result<Option<String>, ActionError> {
        match self.raw(name).await {
            None => Ok(None),
            Some(value @ (Value::String(_) | Value::Number(_))) => Ok(as_text(&value)),
            Some(other) => Err(ActionError::invalid(
                name,
                format!("expected text, got {}", other),
            )),
        }
    }

    pub async fn bool_or(&self, name: &str, default: bool) -> Result<bool, ActionError> {
        match self.raw(name).await {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::String(s)) => match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(ActionError::invalid(
                    name,
                    format!("expected a boolean, got '{}'", other),
                )),
            },
            Some(other) => Err(ActionError::invalid(
                name,
                format!("expected a boolean, got {}", other),
            )),
        }
    }

    pub async fn count_or(&self, name: &str, default: usize) -> Result<usize, ActionError> {
        let Some(value) = self.raw(name).await else {
            return Ok(default);
        };
        let parsed = match &value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                ActionError::invalid(name, format!("expected a non-negative number, got {}", value))
            })
    }

    /// Deserialize a structured parameter, `T::default()` when unset
    pub async fn decode_or_default<T>(&self, name: &str) -> Result<T, ActionError>
    where
        T: DeserializeOwned + Default,
    {
        match self.raw(name).await {
            None => Ok(T::default()),
            Some(value) => {
                serde_json::from_value(value).map_err(|e| ActionError::invalid(name, e.to_string()))
            }
        }
    }
}
