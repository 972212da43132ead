//! Command-line host
//!
//! Plays the workflow engine's part: flags become action parameters, the
//! config file supplies defaults and the environment supplies credentials.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::actions::StaticParameters;
use crate::actions::params::{APP, TABLE};
use crate::api::{HttpTransport, NolocoClient};
use crate::config::{self, Config};

use commands::{config as config_cmd, discover, options, poll, records};

/// Noloco data API from the command line
#[derive(Parser, Debug)]
#[command(name = "noloco-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// App to work in (defaults to `defaults.app` from the config file)
    #[arg(long, short = 'a', global = true)]
    pub app: Option<String>,

    /// Table to work on (defaults to `defaults.table` from the config file)
    #[arg(long, short = 't', global = true)]
    pub table: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the account the credentials belong to
    Me(discover::OutputOnly),

    /// List apps the account can access
    Apps(discover::OutputOnly),

    /// List tables of the app
    Tables(discover::TablesArgs),

    /// Show the field definitions of the table
    Schema(discover::OutputOnly),

    /// Show the mapping columns derived from the table schema
    Columns(discover::OutputOnly),

    /// Create, read, update, delete and search records
    #[command(subcommand)]
    Records(records::RecordCommands),

    /// Run the option loaders used to fill in parameters
    #[command(subcommand)]
    Options(options::OptionCommands),

    /// Poll the table for new or updated records
    Poll(poll::PollArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Resolved settings shared by command handlers
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    app: Option<String>,
    table: Option<String>,
}

impl CommandContext {
    pub fn new(
        cli_app: Option<String>,
        cli_table: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Config::default_path);
        let config = Config::load(&config_path)?.with_env_overrides();
        let app = cli_app.or_else(|| config.defaults.app.clone());
        let table = cli_table.or_else(|| config.defaults.table.clone());
        Ok(Self {
            config,
            config_path,
            app,
            table,
        })
    }

    /// Client over the HTTP transport, credentials from the environment
    pub fn client(&self) -> Result<NolocoClient> {
        let credentials = config::credentials_from_env()
            .context("Missing credentials; set NOLOCO_ACCOUNT_KEY and NOLOCO_APP_KEY")?;
        let transport = HttpTransport::new(&self.config.api.base_url, &credentials)
            .context("Failed to create HTTP client")?;
        log::debug!("Using API at {}", self.config.api.base_url);
        Ok(NolocoClient::new(transport))
    }

    pub fn app(&self) -> Result<&str> {
        self.app.as_deref().context(
            "No app selected. Pass --app or run 'noloco-cli config set defaults.app <name>'",
        )
    }

    pub fn table(&self) -> Result<&str> {
        self.table.as_deref().context(
            "No table selected. Pass --table or run 'noloco-cli config set defaults.table <name>'",
        )
    }

    /// Parameters carrying the selected app and table, where set
    pub fn parameters(&self) -> StaticParameters {
        let mut params = StaticParameters::new();
        if let Some(app) = &self.app {
            params.set(APP, app.as_str());
        }
        if let Some(table) = &self.table {
            params.set(TABLE, table.as_str());
        }
        params
    }
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = CommandContext::new(cli.app, cli.table, cli.config)?;

    match cli.command {
        Commands::Me(args) => discover::me(&ctx, args).await,
        Commands::Apps(args) => discover::apps(&ctx, args).await,
        Commands::Tables(args) => discover::tables(&ctx, args).await,
        Commands::Schema(args) => discover::schema(&ctx, args).await,
        Commands::Columns(args) => discover::columns(&ctx, args).await,
        Commands::Records(command) => records::run(&ctx, command).await,
        Commands::Options(command) => options::run(&ctx, command).await,
        Commands::Poll(args) => poll::run(&ctx, args).await,
        Commands::Config(command) => config_cmd::run(&ctx, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_selection_flags() {
        let cli = Cli::try_parse_from([
            "noloco-cli",
            "records",
            "get",
            "42",
            "--app",
            "crm",
            "-t",
            "contact",
        ])
        .unwrap();
        assert_eq!(cli.app.as_deref(), Some("crm"));
        assert_eq!(cli.table.as_deref(), Some("contact"));
        assert!(matches!(cli.command, Commands::Records(_)));
    }

    #[test]
    fn test_flags_override_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::CONFIG_FILE);
        Config::builder()
            .default_app("crm")
            .default_table("contact")
            .build()
            .save(&path)
            .unwrap();

        let ctx = CommandContext::new(None, Some("deal".to_string()), Some(path)).unwrap();
        assert_eq!(ctx.app().unwrap(), "crm");
        assert_eq!(ctx.table().unwrap(), "deal");
    }

    #[test]
    fn test_missing_selection_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CommandContext::new(None, None, Some(dir.path().join("none.toml"))).unwrap();
        assert!(ctx.app().is_err());
        assert!(ctx.table().is_err());
    }
}
