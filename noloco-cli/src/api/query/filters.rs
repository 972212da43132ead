//! Filter expressions for record queries
//!
//! A filter is a map from field id to a condition, serialized the way the data
//! endpoint expects it: `{"email": {"contains": "@acme.com"}}` or
//! `{"status": {"not": {"equals": "Closed"}}}`. Fields are combined with an
//! implicit AND; the API has no OR across fields.
//!
//! Besides `not`, a condition may be wrapped in `and`, `or`, `some`, `none` or
//! `every`. The last three apply to relationships. Their nested conditions are
//! sent as written.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::metadata::{FieldKind, TableSchema};

/// Key of the negation wrapper
pub const NOT: &str = "not";

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid filter JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid filter: {0}")]
    InvalidShape(String),

    #[error("Unknown filter operator '{0}'")]
    UnknownOperator(String),

    #[error("Field '{0}' is a composite field; filter on one of its sub-fields instead")]
    CompositeField(String),
}

/// Comparison operators supported by the data endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    Contains,
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 8] = [
        Self::Equals,
        Self::Contains,
        Self::In,
        Self::NotIn,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// Operators whose value is a list
    pub fn takes_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys that wrap a nested condition instead of comparing a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterWrapper {
    Not,
    And,
    Or,
    Some,
    None,
    Every,
}

impl FilterWrapper {
    pub const ALL: [FilterWrapper; 6] = [
        Self::Not,
        Self::And,
        Self::Or,
        Self::Some,
        Self::None,
        Self::Every,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => NOT,
            Self::And => "and",
            Self::Or => "or",
            Self::Some => "some",
            Self::None => "none",
            Self::Every => "every",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }
}

impl std::fmt::Display for FilterWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One or more operator/value pairs on a single field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueFilter {
    conditions: Vec<(FilterOperator, Value)>,
}

impl ValueFilter {
    pub fn new(operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            conditions: vec![(operator, value.into())],
        }
    }

    pub fn and(mut self, operator: FilterOperator, value: impl Into<Value>) -> Self {
        self.set(operator, value.into());
        self
    }

    fn set(&mut self, operator: FilterOperator, value: Value) {
        match self.conditions.iter_mut().find(|(op, _)| *op == operator) {
            Some(existing) => existing.1 = value,
            None => self.conditions.push((operator, value)),
        }
    }

    pub fn conditions(&self) -> &[(FilterOperator, Value)] {
        &self.conditions
    }

    pub fn get(&self, operator: FilterOperator) -> Option<&Value> {
        self.conditions
            .iter()
            .find(|(op, _)| *op == operator)
            .map(|(_, v)| v)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (op, value) in &self.conditions {
            map.insert(op.as_str().to_string(), value.clone());
        }
        Value::Object(map)
    }

    fn from_json(field: &str, value: &Value) -> Result<Self, FilterError> {
        let object = value.as_object().ok_or_else(|| {
            FilterError::InvalidShape(format!("condition on '{}' must be an object", field))
        })?;
        if object.is_empty() {
            return Err(FilterError::InvalidShape(format!(
                "condition on '{}' has no operator",
                field
            )));
        }

        let mut filter = ValueFilter::default();
        for (key, value) in object {
            let operator = FilterOperator::parse(key)
                .ok_or_else(|| FilterError::UnknownOperator(key.clone()))?;
            filter.set(operator, value.clone());
        }
        Ok(filter)
    }
}

/// Condition attached to one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    Value(ValueFilter),
    Not(ValueFilter),
    /// Wrapper keys with their nested conditions, in the order written
    Wrapped(Vec<(FilterWrapper, Value)>),
}

impl FieldFilter {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(filter) => filter.to_json(),
            Self::Not(filter) => {
                let mut map = Map::new();
                map.insert(NOT.to_string(), filter.to_json());
                Value::Object(map)
            }
            Self::Wrapped(entries) => {
                let mut map = Map::new();
                for (wrapper, inner) in entries {
                    map.insert(wrapper.as_str().to_string(), inner.clone());
                }
                Value::Object(map)
            }
        }
    }

    fn from_json(field: &str, value: &Value) -> Result<Self, FilterError> {
        let object = match value.as_object() {
            Some(object) if object.keys().any(|k| FilterWrapper::parse(k).is_some()) => object,
            _ => return Ok(Self::Value(ValueFilter::from_json(field, value)?)),
        };

        if object.len() == 1 {
            if let Some(inner) = object.get(NOT) {
                return Ok(Self::Not(ValueFilter::from_json(field, inner)?));
            }
        }

        let mut entries = Vec::with_capacity(object.len());
        for (key, inner) in object {
            let Some(wrapper) = FilterWrapper::parse(key) else {
                return Err(FilterError::InvalidShape(format!(
                    "'{}' on '{}' cannot be combined with wrapper operators",
                    key, field
                )));
            };
            match inner.as_object() {
                Some(nested) if !nested.is_empty() => entries.push((wrapper, inner.clone())),
                _ => {
                    return Err(FilterError::InvalidShape(format!(
                        "'{}' on '{}' must wrap a non-empty object",
                        wrapper, field
                    )));
                }
            }
        }
        Ok(Self::Wrapped(entries))
    }
}

/// Filter over a table's records, one entry per field id
///
/// Entries keep their first insertion position; setting the same field again
/// replaces its condition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterExpression {
    fields: Vec<(String, FieldFilter)>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the condition for a field, replacing any previous one
    pub fn set(&mut self, field: impl Into<String>, filter: FieldFilter) {
        let field = field.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = filter,
            None => self.fields.push((field, filter)),
        }
    }

    pub fn with(mut self, field: impl Into<String>, filter: FieldFilter) -> Self {
        self.set(field, filter);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldFilter> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (field, filter) in &self.fields {
            map.insert(field.clone(), filter.to_json());
        }
        Value::Object(map)
    }

    /// Parse a filter written by hand in the Noloco filter syntax
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self, FilterError> {
        let object = value
            .as_object()
            .ok_or_else(|| FilterError::InvalidShape("filter must be a JSON object".to_string()))?;

        let mut expression = Self::new();
        for (field, condition) in object {
            expression.set(field.clone(), FieldFilter::from_json(field, condition)?);
        }
        Ok(expression)
    }

    /// Reject conditions placed directly on a composite field
    ///
    /// Composite values can only be compared through their sub-fields. Ids the
    /// schema does not know, and plain comparisons on a relationship, are
    /// logged but still sent.
    pub fn check_against(&self, schema: &TableSchema) -> Result<(), FilterError> {
        for (field, filter) in &self.fields {
            match schema.field(field) {
                Some(def) if def.is_relationship() => {
                    if matches!(filter, FieldFilter::Value(_)) {
                        log::warn!(
                            "{}: '{}' is a relationship; compare '{}Id' or use some/none/every",
                            schema.api_name(),
                            field,
                            field
                        );
                    }
                }
                Some(def) if def.kind == FieldKind::Composite => {
                    return Err(FilterError::CompositeField(field.clone()));
                }
                Some(_) => {}
                None if !is_known_alias(schema, field) => {
                    log::warn!("{}: unknown field '{}' in filter", schema.api_name(), field);
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// `parent__child` on a composite field, or `<relationship>Id`
fn is_known_alias(schema: &TableSchema, field: &str) -> bool {
    if let Some((parent, _)) = field.split_once("__") {
        return schema
            .field(parent)
            .is_some_and(|def| def.kind == FieldKind::Composite);
    }
    field
        .strip_suffix("Id")
        .and_then(|name| schema.field(name))
        .is_some_and(|def| def.is_relationship())
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Operator picked in the structured filter builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Filter(FilterOperator),
    /// Rewritten to `not: {equals: ..}`
    NotEquals,
}

impl ConditionOperator {
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        if s == "not_equals" {
            return Ok(Self::NotEquals);
        }
        FilterOperator::parse(s)
            .map(Self::Filter)
            .ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
    }
}

fn default_operator() -> String {
    FilterOperator::Equals.as_str().to_string()
}

/// One row of the structured filter builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

impl FilterCondition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Split a comma-separated list value; arrays pass through untouched
fn list_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::Array(
            s.split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items),
        Value::Null => Value::Array(Vec::new()),
        other => Value::Array(vec![other]),
    }
}

/// Where a call takes its filter from
#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    /// Rows of the structured builder, combined with AND
    Conditions(Vec<FilterCondition>),
    /// Filter JSON typed by the user
    Raw(String),
}

impl FilterInput {
    /// Build the filter expression, `None` when nothing was specified
    pub fn build(&self) -> Result<Option<FilterExpression>, FilterError> {
        match self {
            Self::Conditions(conditions) => from_conditions(conditions),
            Self::Raw(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                FilterExpression::parse(text).map(Some)
            }
        }
    }
}

/// Build a filter from structured builder rows
///
/// Later rows on the same field replace earlier ones.
pub fn from_conditions(
    conditions: &[FilterCondition],
) -> Result<Option<FilterExpression>, FilterError> {
    if conditions.is_empty() {
        return Ok(None);
    }

    let mut expression = FilterExpression::new();
    for condition in conditions {
        let filter = match ConditionOperator::parse(&condition.operator)? {
            ConditionOperator::NotEquals => FieldFilter::Not(ValueFilter::new(
                FilterOperator::Equals,
                condition.value.clone(),
            )),
            ConditionOperator::Filter(op) if op.takes_list() => {
                FieldFilter::Value(ValueFilter::new(op, list_value(condition.value.clone())))
            }
            ConditionOperator::Filter(op) => {
                FieldFilter::Value(ValueFilter::new(op, condition.value.clone()))
            }
        };
        expression.set(condition.field.clone(), filter);
    }
    Ok(Some(expression))
}
