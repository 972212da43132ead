//! Record commands
//!
//! Each command turns its flags into action parameters and runs the matching
//! [`RecordOperation`] over the input items, so the CLI behaves exactly like
//! a workflow step configured with the same values.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use serde_json::{Map, Value, json};

use crate::actions::params::{
    ADDITIONAL_OPTIONS, CUSTOM_QUERY, FIELDS, FILTER_MODE, LIMIT, RECORD_ID, RETURN_ALL, SORT,
    WHERE,
};
use crate::actions::{
    ExecutionContext, InputItem, MappingMode, OutputItem, RecordOperation, StaticParameters,
};
use crate::api::query::{FilterCondition, FilterInput};
use crate::cli::CommandContext;
use crate::cli::output::OutputArgs;

#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// Create one record per input item
    Create(WriteArgs),

    /// Update a record
    Update {
        /// Record id
        id: String,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Delete records by id
    Delete {
        /// Record ids
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Fetch records by id, relationships expanded
    Get {
        /// Record ids
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// List records with an optional JSON filter
    List {
        #[command(flatten)]
        limit: LimitArgs,

        /// Filter as JSON, e.g. '{"status": {"equals": "OPEN"}}'
        #[arg(long)]
        filter: Option<String>,

        /// Sort field: createdAt or updatedAt
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction: ASC or DESC
        #[arg(long)]
        order_by: Option<String>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Search records with field conditions or a JSON query
    Search {
        #[command(flatten)]
        limit: LimitArgs,

        /// Condition as FIELD:OPERATOR:VALUE (or FIELD=VALUE), repeatable
        #[arg(long = "where", short = 'w', conflicts_with = "query")]
        conditions: Vec<String>,

        /// Filter as JSON instead of conditions
        #[arg(long, short = 'q')]
        query: Option<String>,

        /// Sort rule as FIELD[:ASC|DESC]; only createdAt and updatedAt sort
        #[arg(long)]
        sort: Option<String>,

        /// Validate the filter against the table schema before searching
        #[arg(long)]
        check_schema: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },
}

/// Options shared by every record command
#[derive(Args, Debug, Clone, Default)]
pub struct BatchArgs {
    /// Report failed items as `{error}` output and keep going
    #[arg(long)]
    pub continue_on_fail: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LimitArgs {
    /// Fetch every matching record
    #[arg(long, conflicts_with = "limit")]
    pub all: bool,

    /// Maximum number of records to return
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

impl LimitArgs {
    fn apply(&self, params: &mut StaticParameters) {
        params.set(RETURN_ALL, self.all);
        if let Some(limit) = self.limit {
            params.set(LIMIT, limit);
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct WriteArgs {
    /// Field value as COLUMN=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "set", short = 's')]
    pub values: Vec<String>,

    /// Field values as a JSON object keyed by mapping column id
    #[arg(long)]
    pub data: Option<String>,

    /// JSON file with input items (an array of objects or one object)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Write each input item's JSON as-is instead of --set/--data values
    #[arg(long, requires = "input")]
    pub auto_map: bool,

    #[command(flatten)]
    pub batch: BatchArgs,
}

impl WriteArgs {
    fn items(&self) -> Result<Vec<InputItem>> {
        match &self.input {
            None => Ok(vec![InputItem::default()]),
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read input file: {}", path.display()))?;
                let value: Value = serde_json::from_str(&content)
                    .with_context(|| format!("Input file is not valid JSON: {}", path.display()))?;
                let items = InputItem::from_value(value);
                if items.is_empty() {
                    anyhow::bail!("Input file contains no JSON objects: {}", path.display());
                }
                Ok(items)
            }
        }
    }

    fn fields_parameter(&self) -> Result<Value> {
        if self.auto_map {
            return Ok(json!({"mappingMode": MappingMode::AutoMapInputData.as_str()}));
        }

        let mut values = match &self.data {
            None => Map::new(),
            Some(text) => match serde_json::from_str(text).context("--data is not valid JSON")? {
                Value::Object(map) => map,
                other => anyhow::bail!("--data must be a JSON object, got {}", other),
            },
        };
        for assignment in &self.values {
            let (column, value) = parse_assignment(assignment)?;
            values.insert(column, value);
        }
        Ok(json!({
            "mappingMode": MappingMode::DefineBelow.as_str(),
            "value": values,
        }))
    }
}

/// `column=value`, where the value is JSON if it parses and text otherwise
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (column, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected COLUMN=VALUE, got '{}'", assignment))?;
    let column = column.trim();
    if column.is_empty() {
        anyhow::bail!("Missing column name in '{}'", assignment);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((column.to_string(), value))
}

/// `field:operator:value` or `field=value` for equality
fn parse_condition(text: &str) -> Result<FilterCondition> {
    if let Some((field, value)) = text.split_once('=').filter(|(f, _)| !f.contains(':')) {
        return Ok(FilterCondition::new(field.trim(), "equals", value));
    }
    let mut parts = text.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(operator), Some(value)) if !field.trim().is_empty() => {
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            Ok(FilterCondition::new(field.trim(), operator.trim(), value))
        }
        _ => anyhow::bail!("Expected FIELD:OPERATOR:VALUE or FIELD=VALUE, got '{}'", text),
    }
}

/// `field[:direction]` as a one-rule sort parameter
fn sort_parameter(text: &str) -> Value {
    let (field, direction) = match text.split_once(':') {
        Some((field, direction)) => (field, Some(direction)),
        None => (text, None),
    };
    json!({"rules": [{"field": field.trim(), "direction": direction.map(str::trim)}]})
}

async fn execute(
    ctx: &CommandContext,
    operation: RecordOperation,
    params: StaticParameters,
    items: &[InputItem],
    batch: &BatchArgs,
) -> Result<()> {
    let continue_on_fail = batch.continue_on_fail || ctx.config.api.continue_on_fail;
    let exec = ExecutionContext::new(ctx.client()?, Arc::new(params))
        .continue_on_fail(continue_on_fail)
        .page_cap(ctx.config.api.page_cap);

    let output = operation
        .execute(&exec, items)
        .await
        .with_context(|| format!("{} failed", operation))?;

    report(operation, &output);
    let records: Vec<Value> = output.into_iter().map(|item| Value::Object(item.json)).collect();
    batch.output.emit(&Value::Array(records))
}

fn report(operation: RecordOperation, output: &[OutputItem]) {
    let failed = output.iter().filter(|item| item.is_error()).count();
    let succeeded = output.len() - failed;
    if failed > 0 {
        eprintln!(
            "{}: {} item(s), {} failed",
            operation.as_str().cyan(),
            succeeded.to_string().bright_green(),
            failed.to_string().bright_red()
        );
    } else {
        eprintln!(
            "{}: {} item(s)",
            operation.as_str().cyan(),
            succeeded.to_string().bright_green()
        );
    }
}

/// One item per id, each with its own record id
fn id_items(params: StaticParameters, ids: &[String]) -> (StaticParameters, Vec<InputItem>) {
    let params = ids
        .iter()
        .enumerate()
        .fold(params, |params, (index, id)| params.with_item(index, RECORD_ID, id.as_str()));
    (params, vec![InputItem::default(); ids.len()])
}

pub async fn run(ctx: &CommandContext, command: RecordCommands) -> Result<()> {
    // Fail on a missing selection before any request
    ctx.app()?;
    ctx.table()?;
    let mut params = ctx.parameters();

    match command {
        RecordCommands::Create(write) => {
            params.set(FIELDS, write.fields_parameter()?);
            let items = write.items()?;
            execute(ctx, RecordOperation::Create, params, &items, &write.batch).await
        }
        RecordCommands::Update { id, write } => {
            params.set(RECORD_ID, id);
            params.set(FIELDS, write.fields_parameter()?);
            let items = write.items()?;
            execute(ctx, RecordOperation::Update, params, &items, &write.batch).await
        }
        RecordCommands::Delete { ids, batch } => {
            let (params, items) = id_items(params, &ids);
            execute(ctx, RecordOperation::Delete, params, &items, &batch).await
        }
        RecordCommands::Get { ids, batch } => {
            let (params, items) = id_items(params, &ids);
            execute(ctx, RecordOperation::Get, params, &items, &batch).await
        }
        RecordCommands::List {
            limit,
            filter,
            sort_by,
            order_by,
            batch,
        } => {
            limit.apply(&mut params);
            params.set(
                ADDITIONAL_OPTIONS,
                json!({"filter": filter, "sortBy": sort_by, "orderBy": order_by}),
            );
            execute(ctx, RecordOperation::GetMany, params, &[InputItem::default()], &batch).await
        }
        RecordCommands::Search {
            limit,
            conditions,
            query,
            sort,
            check_schema,
            batch,
        } => {
            limit.apply(&mut params);
            let filter_input = match query {
                Some(query) => {
                    params.set(FILTER_MODE, "query");
                    params.set(CUSTOM_QUERY, query.as_str());
                    FilterInput::Raw(query)
                }
                None => {
                    let conditions = conditions
                        .iter()
                        .map(|c| parse_condition(c))
                        .collect::<Result<Vec<_>>>()?;
                    params.set(FILTER_MODE, "builder");
                    params.set(WHERE, json!({"conditions": conditions}));
                    FilterInput::Conditions(conditions)
                }
            };
            if let Some(sort) = sort {
                params.set(SORT, sort_parameter(&sort));
            }
            if check_schema {
                check_filter(ctx, &filter_input).await?;
            }
            execute(ctx, RecordOperation::Search, params, &[InputItem::default()], &batch).await
        }
    }
}

async fn check_filter(ctx: &CommandContext, input: &FilterInput) -> Result<()> {
    let Some(filter) = input.build().context("Invalid filter")? else {
        return Ok(());
    };
    let (app, table) = (ctx.app()?, ctx.table()?);
    let schema = ctx
        .client()?
        .fetch_table_fields(app, table)
        .await
        .with_context(|| format!("Failed to fetch schema of {}/{}", app, table))?;
    filter
        .check_against(&schema)
        .with_context(|| format!("Filter does not fit {}/{}", app, table))?;
    log::debug!("Filter checked against {} field(s)", schema.fields.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::FilterInput;

    #[test]
    fn test_parse_assignment_json_or_text() {
        assert_eq!(parse_assignment("age=42").unwrap(), ("age".to_string(), json!(42)));
        assert_eq!(
            parse_assignment("name=Ada Lovelace").unwrap(),
            ("name".to_string(), json!("Ada Lovelace"))
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), json!("a=b"))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_fields_parameter_merges_data_and_set() {
        let write = WriteArgs {
            values: vec!["address__city=NYC".to_string()],
            data: Some(r#"{"name": "Ada", "address__city": "London"}"#.to_string()),
            ..Default::default()
        };
        assert_eq!(
            write.fields_parameter().unwrap(),
            json!({
                "mappingMode": "defineBelow",
                "value": {"name": "Ada", "address__city": "NYC"}
            })
        );

        let bad = WriteArgs {
            data: Some("[1]".to_string()),
            ..Default::default()
        };
        assert!(bad.fields_parameter().is_err());
    }

    #[test]
    fn test_auto_map_and_input_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"name": "Ada"}, 3, {"name": "Grace"}]"#).unwrap();

        let write = WriteArgs {
            input: Some(path),
            auto_map: true,
            ..Default::default()
        };
        assert_eq!(write.items().unwrap().len(), 2);
        assert_eq!(
            write.fields_parameter().unwrap(),
            json!({"mappingMode": "autoMapInputData"})
        );
        assert_eq!(WriteArgs::default().items().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_condition_forms() {
        assert_eq!(
            parse_condition("status=OPEN").unwrap(),
            FilterCondition::new("status", "equals", "OPEN")
        );
        assert_eq!(
            parse_condition("amount:gte:100").unwrap(),
            FilterCondition::new("amount", "gte", 100)
        );
        assert_eq!(
            parse_condition("url:contains:https://x").unwrap(),
            FilterCondition::new("url", "contains", "https://x")
        );
        assert!(parse_condition("status").is_err());

        let condition = parse_condition("status:not_equals:DONE").unwrap();
        let filter = FilterInput::Conditions(vec![condition])
            .build()
            .unwrap()
            .unwrap();
        assert_eq!(filter.to_json(), json!({"status": {"not": {"equals": "DONE"}}}));
    }

    #[test]
    fn test_sort_parameter() {
        assert_eq!(
            sort_parameter("updatedAt:asc"),
            json!({"rules": [{"field": "updatedAt", "direction": "asc"}]})
        );
        assert_eq!(
            sort_parameter("createdAt"),
            json!({"rules": [{"field": "createdAt", "direction": null}]})
        );
    }

    #[test]
    fn test_id_items_pair_ids() {
        let (_, items) = id_items(StaticParameters::new(), &["1".to_string(), "2".to_string()]);
        assert_eq!(items.len(), 2);
    }
}
