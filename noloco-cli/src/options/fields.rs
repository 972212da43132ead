//! Field-level choices: editable fields, search fields, option values,
//! related records and mapping columns

use super::{OPTIONS_PAGE_SIZE, OptionLoader, PropertyOption, degrade, record_option};
use crate::actions::ActionError;
use crate::actions::params::FIELD_NAME;
use crate::api::constants::is_system_field;
use crate::api::metadata::{FieldDef, TableSchema};
use crate::api::query::RecordQuery;
use crate::mapping::{ColumnId, MappingColumn, RELATIONSHIP_SUFFIX, mapping_columns};

fn field_description(field: &FieldDef) -> String {
    let mut description = match (&field.relationship, field.options().len()) {
        (_, count) if count > 0 => format!("{} - {} options", field.kind, count),
        (Some(relationship), _) => {
            format!("Relationship ({}) - use record ID", relationship.label())
        }
        (None, _) => field.kind.to_string(),
    };
    if field.unique {
        description.push_str(" (unique)");
    }
    description
}

impl OptionLoader {
    async fn selected_schema(&self) -> Result<TableSchema, ActionError> {
        let (app, table) = self.selected_table().await?;
        Ok(self.client.fetch_table_fields(&app, &table).await?)
    }

    async fn selected_field_name(&self) -> Result<String, ActionError> {
        self.params().required_string(FIELD_NAME).await
    }

    /// Fields a write can set, relationships addressed by their id column
    pub async fn fields(&self) -> Vec<PropertyOption> {
        degrade("field", self.try_fields().await)
    }

    async fn try_fields(&self) -> Result<Vec<PropertyOption>, ActionError> {
        let schema = self.selected_schema().await?;
        Ok(schema
            .fields
            .iter()
            .filter(|field| is_editable(field))
            .map(|field| {
                let id = if field.is_relationship() {
                    ColumnId::Relationship(field.api_name.clone())
                } else {
                    ColumnId::Field(field.api_name.clone())
                };
                PropertyOption::new(&field.display, id.wire())
                    .with_description(field_description(field))
            })
            .collect())
    }

    /// Fields a search can compare, record id first
    pub async fn searchable_fields(&self) -> Vec<PropertyOption> {
        degrade("searchable field", self.try_searchable_fields().await)
    }

    async fn try_searchable_fields(&self) -> Result<Vec<PropertyOption>, ActionError> {
        let schema = self.selected_schema().await?;
        let mut options =
            vec![PropertyOption::new("ID", "id").with_description("Record ID (unique)")];
        options.extend(
            schema
                .fields
                .iter()
                .filter(|field| field.api_name != "id" && field.kind.is_searchable())
                .map(|field| {
                    let mut description = field.kind.to_string();
                    if field.unique {
                        description.push_str(" (unique)");
                    }
                    PropertyOption::new(&field.display, &field.api_name)
                        .with_description(description)
                }),
        );
        Ok(options)
    }

    /// Choices of an option field; a relationship id column name is accepted
    pub async fn field_options(&self) -> Vec<PropertyOption> {
        degrade("field value", self.try_field_options().await)
    }

    async fn try_field_options(&self) -> Result<Vec<PropertyOption>, ActionError> {
        let field_name = self.selected_field_name().await?;
        let schema = self.selected_schema().await?;
        let base_name = field_name
            .strip_suffix(RELATIONSHIP_SUFFIX)
            .unwrap_or(&field_name);

        let Some(field) = schema
            .fields
            .iter()
            .find(|f| f.api_name == base_name || f.api_name == field_name)
        else {
            log::debug!("field '{}' not found in {}", field_name, schema.api_name());
            return Ok(Vec::new());
        };

        Ok(field
            .options()
            .iter()
            .map(|option| {
                let entry = PropertyOption::new(&option.display, &option.name);
                match &option.color {
                    Some(color) => entry.with_description(format!("Color: {}", color)),
                    None => entry,
                }
            })
            .collect())
    }

    /// First page of records of a relationship's target table
    pub async fn related_records(&self) -> Vec<PropertyOption> {
        degrade("related record", self.try_related_records().await)
    }

    async fn try_related_records(&self) -> Result<Vec<PropertyOption>, ActionError> {
        let field_name = self.selected_field_name().await?;
        let (app, _) = self.selected_table().await?;
        let schema = self.selected_schema().await?;
        let base_name = field_name
            .strip_suffix(RELATIONSHIP_SUFFIX)
            .unwrap_or(&field_name);

        let Some(target) = schema
            .field(base_name)
            .filter(|f| f.is_relationship())
            .and_then(FieldDef::relationship_target)
        else {
            log::warn!(
                "'{}' in {} is not a relationship with a known target table",
                field_name,
                schema.api_name()
            );
            return Ok(Vec::new());
        };

        let page = self
            .client
            .fetch_records(&app, target, &RecordQuery::new().first(OPTIONS_PAGE_SIZE))
            .await?;
        Ok(page.records.iter().map(record_option).collect())
    }

    /// Mapping columns of the selected table
    pub async fn mapping_columns(&self) -> Vec<MappingColumn> {
        degrade("mapping column", self.try_mapping_columns().await)
    }

    async fn try_mapping_columns(&self) -> Result<Vec<MappingColumn>, ActionError> {
        let schema = self.selected_schema().await?;
        Ok(mapping_columns(&schema))
    }
}

/// Whether a field would be listed by [`OptionLoader::fields`]
pub fn is_editable(field: &FieldDef) -> bool {
    !is_system_field(&field.api_name) && (field.kind.is_searchable() || field.is_relationship())
}
