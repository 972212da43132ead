//! Mapping column descriptors

use serde::{Serialize, Serializer};

use crate::api::metadata::{FieldKind, FieldOption};

/// Separator between a composite field and its sub-field in column ids
pub const SUB_FIELD_SEPARATOR: &str = "__";

/// Suffix of columns that hold the id of a related record
pub const RELATIONSHIP_SUFFIX: &str = "Id";

/// Stable id of a mapping column
///
/// Kept structured so that a parent api name containing the separator never
/// gets confused with a sub-field; flattened to a string only on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    /// Plain field, id is the api name
    Field(String),
    /// Relationship, id is the api name plus `Id`
    Relationship(String),
    /// Sub-field of a composite field, id is `parent__child`
    SubField { parent: String, child: String },
}

impl ColumnId {
    pub fn wire(&self) -> String {
        match self {
            Self::Field(name) => name.clone(),
            Self::Relationship(name) => format!("{}{}", name, RELATIONSHIP_SUFFIX),
            Self::SubField { parent, child } => {
                format!("{}{}{}", parent, SUB_FIELD_SEPARATOR, child)
            }
        }
    }

    /// Interpret a wire id without schema knowledge
    ///
    /// Splits at the first separator; a trailing `Id` is ambiguous without the
    /// schema and is therefore read as a plain field.
    pub fn from_wire(id: &str) -> Self {
        match id.split_once(SUB_FIELD_SEPARATOR) {
            Some((parent, child)) if !parent.is_empty() => Self::SubField {
                parent: parent.to_string(),
                child: child.to_string(),
            },
            _ => Self::Field(id.to_string()),
        }
    }

    /// Api name of the top-level field this column belongs to
    pub fn field_api_name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Relationship(name) => name,
            Self::SubField { parent, .. } => parent,
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire())
    }
}

impl Serialize for ColumnId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire())
    }
}

/// Value type the configuration UI renders for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceType {
    String,
    Number,
    Boolean,
    DateTime,
    /// String restricted to an option list
    Options,
    Object,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "dateTime",
            Self::Options => "options",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&FieldKind> for SurfaceType {
    /// Total over every kind, unknown kinds fall back to `String`
    fn from(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::RichText | FieldKind::Duration => Self::String,
            FieldKind::SingleOption | FieldKind::MultipleOption => Self::Options,
            FieldKind::Integer | FieldKind::Decimal => Self::Number,
            FieldKind::Boolean => Self::Boolean,
            FieldKind::Date => Self::DateTime,
            FieldKind::Composite => Self::Object,
            FieldKind::Unknown(_) => Self::String,
        }
    }
}

/// Selectable value of an options column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnOption {
    /// Label shown to the user
    pub name: String,
    /// Value sent to the API
    pub value: String,
}

impl From<&FieldOption> for ColumnOption {
    fn from(option: &FieldOption) -> Self {
        Self {
            name: option.display.clone(),
            value: option.name.clone(),
        }
    }
}

/// Typed descriptor of one editable field for the configuration UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingColumn {
    pub id: ColumnId,
    pub display_name: String,
    #[serde(rename = "type")]
    pub surface_type: SurfaceType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ColumnOption>,
    pub default_match: bool,
    pub can_be_used_to_match: bool,
    /// The schema does not expose required-ness, so this is always false
    pub required: bool,
    pub display: bool,
}

impl MappingColumn {
    pub fn new(id: ColumnId, display_name: impl Into<String>, surface_type: SurfaceType) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            surface_type,
            options: Vec::new(),
            default_match: false,
            can_be_used_to_match: false,
            required: false,
            display: true,
        }
    }

    pub fn with_options(mut self, options: &[FieldOption]) -> Self {
        self.options = options.iter().map(ColumnOption::from).collect();
        self
    }

    pub fn wire_id(&self) -> String {
        self.id.wire()
    }
}
