//! Field values to write, from the `fields` parameter

use serde::Deserialize;
use serde_json::Value;

use super::error::ActionError;
use super::item::InputItem;
use super::params::{FIELDS, ItemParameters};
use crate::api::query::Record;
use crate::mapping::to_payload;

/// Where the values of a write come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingMode {
    /// Values configured against the mapping columns
    #[default]
    DefineBelow,
    /// The incoming item's JSON as-is
    AutoMapInputData,
}

impl MappingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefineBelow => "defineBelow",
            Self::AutoMapInputData => "autoMapInputData",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "defineBelow" => Some(Self::DefineBelow),
            "autoMapInputData" => Some(Self::AutoMapInputData),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldsParameter {
    #[serde(default)]
    mapping_mode: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

/// Resolve the write payload for an item, nesting composite sub-fields
pub async fn resolve_payload(
    params: &ItemParameters<'_>,
    item: &InputItem,
) -> Result<Record, ActionError> {
    let fields: FieldsParameter = params.decode_or_default(FIELDS).await?;

    let mode = match fields.mapping_mode.as_deref() {
        None => MappingMode::default(),
        Some(raw) => MappingMode::parse(raw).ok_or_else(|| {
            ActionError::invalid(FIELDS, format!("unknown mapping mode '{}'", raw))
        })?,
    };

    match mode {
        MappingMode::AutoMapInputData => Ok(to_payload(&item.json)),
        MappingMode::DefineBelow => match fields.value {
            None | Some(Value::Null) => Ok(Record::new()),
            Some(Value::Object(values)) => Ok(to_payload(&values)),
            Some(other) => Err(ActionError::invalid(
                FIELDS,
                format!("expected mapped values to be an object, got {}", other),
            )),
        },
    }
}
