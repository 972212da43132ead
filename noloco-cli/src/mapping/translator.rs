//! Schema to mapping column translation
//!
//! Turns the field list of a table into the ordered set of columns a user can
//! map values onto. System fields are skipped, relationships become id
//! columns and composite fields are expanded into their sub-fields.

use std::collections::HashSet;

use super::columns::{ColumnId, MappingColumn, SurfaceType};
use super::subfields::CompositeFormat;
use crate::api::metadata::{FieldDef, FieldKind, TableSchema};

/// Translate a table schema into mapping columns
///
/// Pure and deterministic: the same schema always yields the same columns in
/// the same order. Column ids are unique; on a clash the first column wins.
pub fn mapping_columns(schema: &TableSchema) -> Vec<MappingColumn> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for field in schema.user_fields() {
        for column in field_columns(field) {
            let wire = column.wire_id();
            if seen.insert(wire.clone()) {
                columns.push(column);
            } else {
                log::warn!(
                    "{}: duplicate mapping column '{}' ignored",
                    schema.api_name(),
                    wire
                );
            }
        }
    }

    columns
}

/// Columns contributed by a single field
fn field_columns(field: &FieldDef) -> Vec<MappingColumn> {
    if field.is_relationship() {
        if field.relationship_target().is_none() {
            log::debug!(
                "relationship '{}' has no resolvable target, related values will be unavailable",
                field.api_name
            );
        }
        return vec![MappingColumn::new(
            ColumnId::Relationship(field.api_name.clone()),
            &field.display,
            SurfaceType::Number,
        )];
    }

    if field.kind == FieldKind::Composite {
        return composite_columns(field);
    }

    vec![
        MappingColumn::new(
            ColumnId::Field(field.api_name.clone()),
            &field.display,
            SurfaceType::from(&field.kind),
        )
        .with_options(field.options()),
    ]
}

fn composite_columns(field: &FieldDef) -> Vec<MappingColumn> {
    let Some(format) = field.format().and_then(CompositeFormat::lookup) else {
        log::debug!(
            "composite field '{}' has no registered format ({:?}), skipped",
            field.api_name,
            field.format()
        );
        return Vec::new();
    };

    if field.sub_fields().is_empty() {
        log::debug!(
            "composite field '{}' ({}) declares no sub-fields, skipped",
            field.api_name,
            format
        );
        return Vec::new();
    }

    field
        .sub_fields()
        .iter()
        .map(|sub| {
            let label = format!(
                "{} > {}",
                field.display,
                format.sub_field_label(&sub.api_name)
            );
            MappingColumn::new(
                ColumnId::SubField {
                    parent: field.api_name.clone(),
                    child: sub.api_name.clone(),
                },
                label,
                SurfaceType::from(&sub.kind),
            )
            .with_options(&sub.options)
        })
        .collect()
}
