//! Noloco schema models

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::api::constants::is_system_field;

/// Current account, as returned by `/v1/meta/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// An app (container) the account has access to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    #[serde(default)]
    pub id: Option<Value>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppsResponse {
    #[serde(default)]
    pub apps: Vec<App>,
}

/// Data source backing a table
///
/// Unknown sources are kept verbatim so new integrations do not break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataSource {
    Internal,
    Airtable,
    Api,
    GoogleSheets,
    Hubspot,
    Mysql,
    Postgres,
    SmartSuite,
    Stripe,
    Xano,
    Other(String),
}

impl From<String> for DataSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "INTERNAL" => Self::Internal,
            "AIRTABLE" => Self::Airtable,
            "API" => Self::Api,
            "GOOGLE_SHEETS" => Self::GoogleSheets,
            "HUBSPOT" => Self::Hubspot,
            "MYSQL" => Self::Mysql,
            "POSTGRES" => Self::Postgres,
            "SMART_SUITE" => Self::SmartSuite,
            "STRIPE" => Self::Stripe,
            "XANO" => Self::Xano,
            _ => Self::Other(value),
        }
    }
}

impl From<DataSource> for String {
    fn from(source: DataSource) -> Self {
        match source {
            DataSource::Internal => "INTERNAL".to_string(),
            DataSource::Airtable => "AIRTABLE".to_string(),
            DataSource::Api => "API".to_string(),
            DataSource::GoogleSheets => "GOOGLE_SHEETS".to_string(),
            DataSource::Hubspot => "HUBSPOT".to_string(),
            DataSource::Mysql => "MYSQL".to_string(),
            DataSource::Postgres => "POSTGRES".to_string(),
            DataSource::SmartSuite => "SMART_SUITE".to_string(),
            DataSource::Stripe => "STRIPE".to_string(),
            DataSource::Xano => "XANO".to_string(),
            DataSource::Other(other) => other,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Table summary, as listed by `/v1/schema/{app}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub api_name: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub source: Option<DataSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// Table with its ordered field definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(flatten)]
    pub table: Table,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TableSchema {
    pub fn new(api_name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let api_name = api_name.into();
        Self {
            table: Table {
                id: None,
                name: api_name.clone(),
                display: api_name.clone(),
                api_name,
                description: None,
                enabled: true,
                source: None,
            },
            fields,
        }
    }

    pub fn api_name(&self) -> &str {
        &self.table.api_name
    }

    /// Find a field by api name
    pub fn field(&self, api_name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.api_name == api_name)
    }

    /// Fields that are not managed by Noloco
    pub fn user_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !is_system_field(&f.api_name))
    }
}

/// Primitive kind of a field
///
/// Closed set of the kinds Noloco documents. Anything else lands in `Unknown`
/// so that schema drift never fails decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Date,
    Integer,
    Decimal,
    Duration,
    Boolean,
    RichText,
    SingleOption,
    MultipleOption,
    /// Structured value with a named sub-field layout (`OBJECT`)
    Composite,
    Unknown(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "TEXT",
            Self::Date => "DATE",
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
            Self::Duration => "DURATION",
            Self::Boolean => "BOOLEAN",
            Self::RichText => "RICH_TEXT",
            Self::SingleOption => "SINGLE_OPTION",
            Self::MultipleOption => "MULTIPLE_OPTION",
            Self::Composite => "OBJECT",
            Self::Unknown(other) => other,
        }
    }

    /// Kinds that can be compared in a search filter
    pub fn is_searchable(&self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::SingleOption
                | Self::MultipleOption
                | Self::Duration
                | Self::Decimal
                | Self::Integer
                | Self::Boolean
                | Self::Date
        )
    }
}

impl From<&str> for FieldKind {
    fn from(value: &str) -> Self {
        match value {
            "TEXT" => Self::Text,
            "DATE" => Self::Date,
            "INTEGER" => Self::Integer,
            "DECIMAL" => Self::Decimal,
            "DURATION" => Self::Duration,
            "BOOLEAN" => Self::Boolean,
            "RICH_TEXT" => Self::RichText,
            "SINGLE_OPTION" => Self::SingleOption,
            "MULTIPLE_OPTION" => Self::MultipleOption,
            "OBJECT" => Self::Composite,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relationship cardinality between two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToOne => "MANY_TO_ONE",
            Self::ManyToMany => "MANY_TO_MANY",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseRelationship {
    pub field_api_name: String,
    #[serde(default)]
    pub relationship: Option<RelationshipKind>,
}

/// Choice of a single/multiple option field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub display: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

/// Sub-field declaration of a composite field (`typeOptions.subFields`)
#[derive(Debug, Clone, PartialEq)]
pub struct SubFieldDecl {
    pub api_name: String,
    pub kind: FieldKind,
    pub type_options: Option<Value>,
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubField {
    #[serde(default, rename = "type")]
    kind: Option<FieldKind>,
    #[serde(default)]
    type_options: Option<Value>,
    #[serde(default)]
    options: Option<Vec<RawSubFieldOption>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSubFieldOption {
    name: String,
    display: String,
}

/// `typeOptions` of a field; only the composite layout is typed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_sub_fields",
        serialize_with = "serialize_sub_fields",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sub_fields: Vec<SubFieldDecl>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_sub_fields<'de, D>(deserializer: D) -> Result<Vec<SubFieldDecl>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.into_iter()
        .map(|(api_name, value)| {
            // A null declaration is still a sub-field, just without type info
            let decl: RawSubField = if value.is_null() {
                RawSubField::default()
            } else {
                serde_json::from_value(value)
                    .map_err(<D::Error as serde::de::Error>::custom)?
            };
            let options = decl
                .options
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(idx, opt)| FieldOption {
                    id: Some(idx as i64),
                    name: opt.name,
                    display: opt.display,
                    color: None,
                    order: Some(idx as i64),
                })
                .collect();
            Ok(SubFieldDecl {
                api_name,
                kind: decl.kind.unwrap_or(FieldKind::Text),
                type_options: decl.type_options,
                options,
            })
        })
        .collect()
}

fn serialize_sub_fields<S>(sub_fields: &[SubFieldDecl], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = Map::new();
    for sub in sub_fields {
        let raw = RawSubField {
            kind: Some(sub.kind.clone()),
            type_options: sub.type_options.clone(),
            options: if sub.options.is_empty() {
                None
            } else {
                Some(
                    sub.options
                        .iter()
                        .map(|o| RawSubFieldOption {
                            name: o.name.clone(),
                            display: o.display.clone(),
                        })
                        .collect(),
                )
            },
        };
        let value = serde_json::to_value(raw).map_err(<S::Error as serde::ser::Error>::custom)?;
        map.insert(sub.api_name.clone(), value);
    }
    map.serialize(serializer)
}

/// A single field definition from `/v1/schema/{app}/{table}?format=input`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub api_name: String,
    #[serde(default)]
    pub display: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub type_options: Option<TypeOptions>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub relationship: Option<RelationshipKind>,
    #[serde(default)]
    pub reverse_relationship: Option<ReverseRelationship>,
    /// Target table of a relationship
    #[serde(default)]
    pub relationship_data_type: Option<TableSchema>,
}

impl FieldDef {
    /// Minimal field definition, mostly useful to build schemas by hand
    pub fn new(api_name: impl Into<String>, display: impl Into<String>, kind: FieldKind) -> Self {
        let api_name = api_name.into();
        Self {
            id: None,
            name: api_name.clone(),
            api_name,
            display: display.into(),
            kind,
            type_options: None,
            multiple: false,
            unique: false,
            options: None,
            relationship: None,
            reverse_relationship: None,
            relationship_data_type: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_relationship(
        mut self,
        kind: RelationshipKind,
        target: Option<TableSchema>,
    ) -> Self {
        self.relationship = Some(kind);
        self.relationship_data_type = target;
        self
    }

    pub fn options(&self) -> &[FieldOption] {
        self.options.as_deref().unwrap_or(&[])
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    /// Api name of the table a relationship points at
    pub fn relationship_target(&self) -> Option<&str> {
        self.relationship_data_type
            .as_ref()
            .map(|t| t.api_name())
            .filter(|name| !name.is_empty())
    }

    /// Declared composite format, e.g. `address`
    pub fn format(&self) -> Option<&str> {
        self.type_options.as_ref()?.format.as_deref()
    }

    pub fn sub_fields(&self) -> &[SubFieldDecl] {
        self.type_options
            .as_ref()
            .map(|t| t.sub_fields.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_kind_roundtrip_and_drift() {
        let kind: FieldKind = serde_json::from_value(json!("SINGLE_OPTION")).unwrap();
        assert_eq!(kind, FieldKind::SingleOption);

        let kind: FieldKind = serde_json::from_value(json!("OBJECT")).unwrap();
        assert_eq!(kind, FieldKind::Composite);

        let kind: FieldKind = serde_json::from_value(json!("FILE")).unwrap();
        assert_eq!(kind, FieldKind::Unknown("FILE".to_string()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!("FILE"));
    }

    #[test]
    fn test_relationship_label() {
        let kind: RelationshipKind = serde_json::from_value(json!("MANY_TO_ONE")).unwrap();
        assert_eq!(kind, RelationshipKind::ManyToOne);
        assert_eq!(kind.label(), "MANY_TO_ONE");
    }

    #[test]
    fn test_parse_table_schema_with_composite() {
        let schema: TableSchema = serde_json::from_value(json!({
            "id": 3,
            "name": "company",
            "apiName": "company",
            "display": "Company",
            "description": null,
            "enabled": true,
            "source": "INTERNAL",
            "fields": [
                {
                    "id": 1,
                    "name": "name",
                    "apiName": "name",
                    "display": "Name",
                    "type": "TEXT",
                    "typeOptions": null,
                    "multiple": false,
                    "unique": true,
                    "options": null,
                    "relationship": null,
                    "reverseRelationship": null,
                    "relationshipDataType": null
                },
                {
                    "apiName": "address",
                    "display": "Address",
                    "type": "OBJECT",
                    "typeOptions": {
                        "format": "address",
                        "subFields": {
                            "street": { "type": "TEXT" },
                            "city": {},
                            "country": {
                                "type": "SINGLE_OPTION",
                                "options": [{ "name": "BE", "display": "Belgium" }]
                            }
                        }
                    }
                },
                {
                    "apiName": "owner",
                    "display": "Owner",
                    "type": "user",
                    "relationship": "MANY_TO_ONE",
                    "relationshipDataType": { "apiName": "user", "display": "User" }
                }
            ]
        }))
        .unwrap();

        assert_eq!(schema.api_name(), "company");
        assert_eq!(schema.table.source, Some(DataSource::Internal));
        assert_eq!(schema.fields.len(), 3);
        assert!(schema.field("name").unwrap().unique);

        let address = schema.field("address").unwrap();
        assert_eq!(address.kind, FieldKind::Composite);
        assert_eq!(address.format(), Some("address"));
        let names: Vec<_> = address.sub_fields().iter().map(|s| s.api_name.as_str()).collect();
        assert_eq!(names, vec!["street", "city", "country"]);
        assert_eq!(address.sub_fields()[1].kind, FieldKind::Text);
        assert_eq!(address.sub_fields()[2].options[0].display, "Belgium");

        let owner = schema.field("owner").unwrap();
        assert_eq!(owner.relationship, Some(RelationshipKind::ManyToOne));
        assert_eq!(owner.relationship_target(), Some("user"));
    }

    #[test]
    fn test_null_sub_fields_are_empty() {
        let field: FieldDef = serde_json::from_value(json!({
            "apiName": "location",
            "display": "Location",
            "type": "OBJECT",
            "typeOptions": { "format": "coordinates", "subFields": null }
        }))
        .unwrap();
        assert!(field.sub_fields().is_empty());
    }

    #[test]
    fn test_user_fields_skip_system_fields() {
        let schema = TableSchema::new(
            "task",
            vec![
                FieldDef::new("id", "ID", FieldKind::Integer),
                FieldDef::new("uuid", "UUID", FieldKind::Text),
                FieldDef::new("title", "Title", FieldKind::Text),
                FieldDef::new("createdAt", "Created", FieldKind::Date),
            ],
        );
        let names: Vec<_> = schema.user_fields().map(|f| f.api_name.as_str()).collect();
        assert_eq!(names, vec!["title"]);
    }
}
