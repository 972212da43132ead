//! Noloco API module
//!
//! Typed access to the Noloco schema and data endpoints over a pluggable,
//! authenticated transport, plus filter building and cursor pagination for
//! record queries.

pub mod client;
pub mod constants;
pub mod error;
pub mod metadata;
pub mod query;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::NolocoClient;
pub use error::ApiError;
pub use metadata::{
    AccountInfo, App, FieldDef, FieldKind, FieldOption, RelationshipKind, SubFieldDecl, Table,
    TableSchema,
};
pub use query::{
    FilterExpression, FilterInput, PageLimits, Record, RecordPage, RecordPager, RecordQuery,
    SortDirection, SortField,
};
pub use transport::{ApiRequest, ApiTransport, Credentials, HttpMethod, HttpTransport};
