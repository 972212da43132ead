//! Account, app and schema discovery

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde_json::Value;

use crate::cli::CommandContext;
use crate::cli::output::OutputArgs;
use crate::mapping::mapping_columns;

#[derive(Args, Debug, Clone)]
pub struct OutputOnly {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TablesArgs {
    /// Include tables that are disabled in the app
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

fn to_value(data: &impl serde::Serialize) -> Result<Value> {
    serde_json::to_value(data).context("Failed to serialize result")
}

pub async fn me(ctx: &CommandContext, args: OutputOnly) -> Result<()> {
    let account = match ctx.client()?.fetch_me().await {
        Ok(account) => account,
        Err(err) if err.is_auth_error() => {
            anyhow::bail!(
                "Credentials rejected ({}); check NOLOCO_ACCOUNT_KEY and NOLOCO_APP_KEY",
                err
            )
        }
        Err(err) => return Err(err).context("Failed to fetch account info"),
    };
    eprintln!("Authenticated as {}", account.email.bright_green().bold());
    args.output.emit(&to_value(&account)?)
}

pub async fn apps(ctx: &CommandContext, args: OutputOnly) -> Result<()> {
    let apps = ctx
        .client()?
        .fetch_apps()
        .await
        .context("Failed to list apps")?;
    eprintln!("{} app(s)", apps.len().to_string().cyan());
    args.output.emit(&to_value(&apps)?)
}

pub async fn tables(ctx: &CommandContext, args: TablesArgs) -> Result<()> {
    let app = ctx.app()?;
    let tables: Vec<_> = ctx
        .client()?
        .fetch_tables(app)
        .await
        .with_context(|| format!("Failed to list tables of {}", app))?
        .into_iter()
        .filter(|table| args.all || table.enabled)
        .collect();
    eprintln!(
        "{} table(s) in {}",
        tables.len().to_string().cyan(),
        app.bright_green()
    );
    args.output.emit(&to_value(&tables)?)
}

pub async fn schema(ctx: &CommandContext, args: OutputOnly) -> Result<()> {
    let (app, table) = (ctx.app()?, ctx.table()?);
    let schema = ctx
        .client()?
        .fetch_table_fields(app, table)
        .await
        .with_context(|| format!("Failed to fetch schema of {}/{}", app, table))?;
    eprintln!(
        "{} field(s) in {}",
        schema.fields.len().to_string().cyan(),
        schema.table.display.bright_green()
    );
    args.output.emit(&to_value(&schema)?)
}

pub async fn columns(ctx: &CommandContext, args: OutputOnly) -> Result<()> {
    let (app, table) = (ctx.app()?, ctx.table()?);
    let schema = ctx
        .client()?
        .fetch_table_fields(app, table)
        .await
        .with_context(|| format!("Failed to fetch schema of {}/{}", app, table))?;
    let columns = mapping_columns(&schema);
    eprintln!(
        "{} mapping column(s) for {}",
        columns.len().to_string().cyan(),
        schema.table.display.bright_green()
    );
    args.output.emit(&to_value(&columns)?)
}
