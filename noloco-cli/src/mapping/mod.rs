//! Field mapping
//!
//! Translation of table schemas into typed mapping columns, and of values
//! collected against those columns back into write payloads.

pub mod columns;
pub mod payload;
pub mod subfields;
pub mod translator;

pub use columns::{
    ColumnId, ColumnOption, MappingColumn, RELATIONSHIP_SUFFIX, SUB_FIELD_SEPARATOR, SurfaceType,
};
pub use payload::to_payload;
pub use subfields::CompositeFormat;
pub use translator::mapping_columns;
