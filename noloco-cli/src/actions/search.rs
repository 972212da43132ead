//! Search records with the filter builder or a custom JSON query

use serde::Deserialize;

use super::params::{APP, CUSTOM_QUERY, FILTER_MODE, SORT, TABLE, WHERE};
use super::{ActionError, ExecutionContext, ItemParameters, OutputItem, record_items};
use crate::api::query::{
    FilterCondition, FilterInput, INCLUDE_ALL, RecordPager, SortDirection, SortField,
};

/// How the search filter is specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Structured conditions from the `where` parameter
    #[default]
    Builder,
    /// Raw JSON from the `customQuery` parameter
    Query,
}

impl FilterMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "builder" => Some(Self::Builder),
            "query" => Some(Self::Query),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WhereParameter {
    #[serde(default)]
    conditions: Vec<FilterCondition>,
}

#[derive(Debug, Deserialize)]
struct SortRule {
    #[serde(default)]
    field: String,
    #[serde(default)]
    direction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SortParameter {
    #[serde(default)]
    rules: Vec<SortRule>,
}

async fn filter_input(params: &ItemParameters<'_>) -> Result<FilterInput, ActionError> {
    let mode = match params.optional_string(FILTER_MODE).await? {
        None => FilterMode::default(),
        Some(raw) => FilterMode::parse(&raw).ok_or_else(|| {
            ActionError::invalid(FILTER_MODE, format!("unknown filter mode '{}'", raw))
        })?,
    };

    Ok(match mode {
        FilterMode::Query => {
            FilterInput::Raw(params.optional_string(CUSTOM_QUERY).await?.unwrap_or_default())
        }
        FilterMode::Builder => {
            let where_param: WhereParameter = params.decode_or_default(WHERE).await?;
            FilterInput::Conditions(where_param.conditions)
        }
    })
}

/// Only the first rule is honoured, and its field only when it is a sortable
/// timestamp; other fields fall back to the server's default order.
fn sort_order(sort: &SortParameter) -> Result<(Option<SortField>, SortDirection), ActionError> {
    let Some(rule) = sort.rules.first() else {
        return Ok((None, SortDirection::default()));
    };
    if sort.rules.len() > 1 {
        log::debug!("{} sort rules given, only the first is used", sort.rules.len());
    }

    let direction = match rule.direction.as_deref() {
        None | Some("") => SortDirection::default(),
        Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
            ActionError::invalid(SORT, format!("unsupported direction '{}'", raw))
        })?,
    };
    let field = SortField::parse(&rule.field);
    if field.is_none() {
        log::debug!("sorting by '{}' is not supported, using default order", rule.field);
    }
    Ok((field, direction))
}

pub(super) async fn execute(
    ctx: &ExecutionContext,
    index: usize,
) -> Result<Vec<OutputItem>, ActionError> {
    let params = ctx.params(index);
    let app = params.required_string(APP).await?;
    let table = params.required_string(TABLE).await?;
    let limits = ctx.page_limits(&params).await?;
    let filter = filter_input(&params).await?.build()?;
    let sort: SortParameter = params.decode_or_default(SORT).await?;
    let (sort_by, order_by) = sort_order(&sort)?;

    let collected = RecordPager::new(&app, &table)
        .filter(filter)
        .sort(sort_by, order_by)
        .include(vec![INCLUDE_ALL.to_string()])
        .limits(limits)
        .collect(&ctx.client)
        .await?;
    log::info!(
        "Search in {}/{} matched {} record(s)",
        app,
        table,
        collected.records.len()
    );

    Ok(record_items(collected.records, index))
}
