//! Option loaders for the configuration UI
//!
//! Each loader reads the current `app` / `dataType` selection from the host's
//! parameters and returns the choices for one dropdown or search list. They
//! never fail: a missing selection, an unreachable API or an unexpected
//! response all produce an empty list, logged at warn level.

pub mod fields;
pub mod lists;

use std::sync::Arc;

use serde::Serialize;

use crate::actions::params::{APP, TABLE};
use crate::actions::{ActionError, ItemParameters, ParameterSource};
use crate::api::NolocoClient;
use crate::api::query::{Record, record_id};

/// Records fetched per page by the list loaders
pub const OPTIONS_PAGE_SIZE: usize = 100;

/// One selectable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyOption {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Searchable list with an optional continuation token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSearchResult {
    pub results: Vec<PropertyOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<String>,
}

/// Loads UI choices against the current parameter selection
#[derive(Clone)]
pub struct OptionLoader {
    client: NolocoClient,
    parameters: Arc<dyn ParameterSource>,
}

impl OptionLoader {
    pub fn new(client: NolocoClient, parameters: Arc<dyn ParameterSource>) -> Self {
        Self { client, parameters }
    }

    fn params(&self) -> ItemParameters<'_> {
        ItemParameters::new(self.parameters.as_ref(), 0)
    }

    async fn selected_table(&self) -> Result<(String, String), ActionError> {
        let params = self.params();
        let app = params.required_string(APP).await?;
        let table = params.required_string(TABLE).await?;
        Ok((app, table))
    }
}

/// Swallow a loader failure into an empty result
fn degrade<T: Default>(loader: &str, result: Result<T, ActionError>) -> T {
    result.unwrap_or_else(|err| {
        log::warn!("{} options unavailable: {}", loader, err);
        T::default()
    })
}

/// Human-readable label of a record for dropdowns
pub fn record_display_name(record: &Record) -> String {
    ["name", "title", "email", "display"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("Record #{}", record_id(record).unwrap_or_default()))
}

fn record_option(record: &Record) -> PropertyOption {
    PropertyOption::new(
        record_display_name(record),
        record_id(record).unwrap_or_default(),
    )
}
