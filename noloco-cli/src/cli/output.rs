//! Result formatting shared by all commands

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Single-line JSON
    JsonCompact,
    /// Comma-separated values, one row per object
    Csv,
}

/// Where and how a command prints its result
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    pub fn emit(&self, data: &Value) -> Result<()> {
        let formatted = format_output(data, self.format)?;

        match &self.output {
            Some(path) => {
                fs::write(path, &formatted)
                    .with_context(|| format!("Failed to write output to: {}", path.display()))?;
                eprintln!(
                    "Results saved to: {}",
                    path.display().to_string().bright_green()
                );
            }
            None => println!("{}", formatted),
        }
        Ok(())
    }
}

pub fn format_output(data: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to format JSON output")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(data).context("Failed to format JSON output")
        }
        OutputFormat::Csv => json_to_csv(data),
    }
}

/// Rows are array elements (or the single object); columns are the union of
/// their keys in first-seen order.
fn json_to_csv(data: &Value) -> Result<String> {
    let rows: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut headers: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    for row in &rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if seen.insert(key.clone()) {
                    headers.push(key.clone());
                }
            }
        }
    }
    if headers.is_empty() {
        headers.push("value".to_string());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&headers)
        .context("Failed to write CSV header")?;

    for row in rows {
        let record: Vec<String> = match row {
            Value::Object(map) => headers
                .iter()
                .map(|h| cell(map.get(h).unwrap_or(&Value::Null)))
                .collect(),
            other => vec![cell(other)],
        };
        writer
            .write_record(&record)
            .context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_union_of_columns() {
        let data = json!([
            {"id": 1, "name": "Ada, Countess"},
            {"id": 2, "email": "grace@example.com", "tags": ["a", "b"]}
        ]);
        let csv = format_output(&data, OutputFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "id,name,email,tags");
        assert_eq!(lines[1], "1,\"Ada, Countess\",,");
        assert_eq!(lines[2], "2,,grace@example.com,\"[\"\"a\"\",\"\"b\"\"]\"");
    }

    #[test]
    fn test_csv_single_object() {
        let csv = format_output(&json!({"success": true}), OutputFormat::Csv).unwrap();
        assert_eq!(csv, "success\ntrue\n");
    }

    #[test]
    fn test_csv_scalars() {
        let csv = format_output(&json!(["a", "b"]), OutputFormat::Csv).unwrap();
        assert_eq!(csv, "value\na\nb\n");
    }

    #[test]
    fn test_json_compact() {
        let out = format_output(&json!({"a": 1}), OutputFormat::JsonCompact).unwrap();
        assert_eq!(out, "{\"a\":1}");
    }
}
