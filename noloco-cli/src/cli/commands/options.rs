//! Option loader commands
//!
//! Loaders never fail; an empty list with a warning in the log is what the
//! configuration UI would see too.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use serde_json::Value;

use crate::actions::params::FIELD_NAME;
use crate::cli::CommandContext;
use crate::cli::output::OutputArgs;
use crate::options::OptionLoader;

#[derive(Subcommand, Debug)]
pub enum OptionCommands {
    /// Apps the account can access
    Apps(LoaderArgs),

    /// Enabled tables of the app
    Tables {
        /// Case-insensitive text to match
        #[arg(long)]
        filter: Option<String>,

        #[command(flatten)]
        args: LoaderArgs,
    },

    /// One page of records of the table
    Records {
        /// Case-insensitive text to match against record names
        #[arg(long)]
        filter: Option<String>,

        /// Token returned by the previous page
        #[arg(long)]
        token: Option<String>,

        #[command(flatten)]
        args: LoaderArgs,
    },

    /// Fields a create or update can set
    Fields(LoaderArgs),

    /// Fields a search can compare
    Searchable(LoaderArgs),

    /// Choices of an option field
    FieldOptions {
        /// Field api name (a relationship's `Id` column is accepted)
        field: String,

        #[command(flatten)]
        args: LoaderArgs,
    },

    /// Records a relationship field can point to
    Related {
        /// Relationship field api name or its `Id` column
        field: String,

        #[command(flatten)]
        args: LoaderArgs,
    },

    /// Mapping columns of the table
    Columns(LoaderArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoaderArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

fn loader(ctx: &CommandContext, field: Option<&str>) -> Result<OptionLoader> {
    let mut params = ctx.parameters();
    if let Some(field) = field {
        params.set(FIELD_NAME, field);
    }
    Ok(OptionLoader::new(ctx.client()?, Arc::new(params)))
}

fn emit(args: &LoaderArgs, data: &impl serde::Serialize, count: usize) -> Result<()> {
    if count == 0 {
        eprintln!("{}", "No options (see RUST_LOG=warn output for the reason)".yellow());
    } else {
        eprintln!("{} option(s)", count.to_string().cyan());
    }
    let value: Value = serde_json::to_value(data).context("Failed to serialize options")?;
    args.output.emit(&value)
}

pub async fn run(ctx: &CommandContext, command: OptionCommands) -> Result<()> {
    match command {
        OptionCommands::Apps(args) => {
            let result = loader(ctx, None)?.apps().await;
            emit(&args, &result, result.results.len())
        }
        OptionCommands::Tables { filter, args } => {
            let result = loader(ctx, None)?.tables(filter.as_deref()).await;
            emit(&args, &result, result.results.len())
        }
        OptionCommands::Records {
            filter,
            token,
            args,
        } => {
            let result = loader(ctx, None)?
                .records(filter.as_deref(), token.as_deref())
                .await;
            if let Some(token) = &result.pagination_token {
                eprintln!("Next page: --token {}", token.bright_green());
            }
            emit(&args, &result, result.results.len())
        }
        OptionCommands::Fields(args) => {
            let result = loader(ctx, None)?.fields().await;
            emit(&args, &result, result.len())
        }
        OptionCommands::Searchable(args) => {
            let result = loader(ctx, None)?.searchable_fields().await;
            emit(&args, &result, result.len())
        }
        OptionCommands::FieldOptions { field, args } => {
            let result = loader(ctx, Some(&field))?.field_options().await;
            emit(&args, &result, result.len())
        }
        OptionCommands::Related { field, args } => {
            let result = loader(ctx, Some(&field))?.related_records().await;
            emit(&args, &result, result.len())
        }
        OptionCommands::Columns(args) => {
            let result = loader(ctx, None)?.mapping_columns().await;
            emit(&args, &result, result.len())
        }
    }
}
