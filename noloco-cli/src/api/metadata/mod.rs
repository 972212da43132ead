//! Noloco schema metadata

pub mod models;

pub use models::{
    AccountInfo, App, AppsResponse, DataSource, FieldDef, FieldKind, FieldOption,
    RelationshipKind, ReverseRelationship, SubFieldDecl, Table, TableSchema, TablesResponse,
    TypeOptions,
};
