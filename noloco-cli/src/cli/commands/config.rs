//! Config command - configuration management

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::cli::CommandContext;
use crate::config::{ACCOUNT_KEY_VAR, APP_KEY_VAR, CheckpointStore, Config};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,

    /// Show the config and state file locations
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Set a value, e.g. `defaults.app my-app`
    Set {
        /// One of api.base_url, api.page_cap, api.continue_on_fail,
        /// defaults.app, defaults.table
        key: String,
        value: String,
    },
}

pub fn run(ctx: &CommandContext, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let rendered =
                toml::to_string_pretty(&ctx.config).context("Failed to render config")?;
            println!("# {}", ctx.config_path.display().to_string().dimmed());
            println!("{}", rendered);
            for var in [ACCOUNT_KEY_VAR, APP_KEY_VAR] {
                let status = if std::env::var(var).is_ok_and(|v| !v.trim().is_empty()) {
                    "set".bright_green()
                } else {
                    "not set".bright_red()
                };
                println!("# {}: {}", var, status);
            }
            Ok(())
        }
        ConfigCommands::Path => {
            println!("config: {}", ctx.config_path.display());
            println!("state:  {}", CheckpointStore::default_path().display());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            if ctx.config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
            Config::default().save(&ctx.config_path)?;
            println!(
                "Wrote {}",
                ctx.config_path.display().to_string().bright_green()
            );
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(&ctx.config_path)?;
            config.set_value(&key, &value)?;
            config.save(&ctx.config_path)?;
            println!("{} = {}", key.cyan(), value);
            Ok(())
        }
    }
}
