//! CLI configuration
//!
//! Settings live in a TOML file under the user's config directory
//! (`~/.config/noloco-cli/config.toml` on Linux). Credentials are never
//! written there; they come from the environment, optionally via a `.env`
//! file loaded at startup.
//!
//! ```toml
//! [api]
//! base_url = "https://api.portals.noloco.io"
//! page_cap = 100
//! continue_on_fail = false
//!
//! [defaults]
//! app = "my-app"
//! table = "contact"
//! ```
//!
//! Environment variables:
//!
//! - `NOLOCO_ACCOUNT_KEY` / `NOLOCO_APP_KEY` - API credentials
//! - `NOLOCO_BASE_URL` - override `api.base_url`

pub mod state;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::constants::{BASE_API_URL, MAX_PAGE_SIZE};
use crate::api::Credentials;

pub use state::CheckpointStore;

pub const APP_DIR: &str = "noloco-cli";
pub const CONFIG_FILE: &str = "config.toml";

pub const ACCOUNT_KEY_VAR: &str = "NOLOCO_ACCOUNT_KEY";
pub const APP_KEY_VAR: &str = "NOLOCO_APP_KEY";
pub const BASE_URL_VAR: &str = "NOLOCO_BASE_URL";

/// API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Largest page requested from the data endpoint
    pub page_cap: usize,
    /// Report failed items as `{error}` output instead of stopping
    pub continue_on_fail: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_API_URL.to_string(),
            page_cap: MAX_PAGE_SIZE,
            continue_on_fail: false,
        }
    }
}

/// Values used when a command omits `--app` / `--table`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: DefaultsConfig,
}

/// Directory holding the config and state files
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn default_path() -> PathBuf {
        config_dir().join(CONFIG_FILE)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_VAR).filter(|u| !u.trim().is_empty()) {
            log::debug!("Base URL overridden by {}", BASE_URL_VAR);
            self.api.base_url = url.trim().to_string();
        }
        self
    }

    /// Set a single value by dotted key, as used by `config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.page_cap" => {
                let cap: usize = value
                    .parse()
                    .with_context(|| format!("'{}' is not a valid page size", value))?;
                anyhow::ensure!(cap > 0, "api.page_cap must be at least 1");
                self.api.page_cap = cap;
            }
            "api.continue_on_fail" => {
                self.api.continue_on_fail = value
                    .parse()
                    .with_context(|| format!("'{}' is not true or false", value))?
            }
            "defaults.app" => self.defaults.app = Some(value.to_string()).filter(|v| !v.is_empty()),
            "defaults.table" => {
                self.defaults.table = Some(value.to_string()).filter(|v| !v.is_empty())
            }
            other => anyhow::bail!("Unknown config key: {}", other),
        }
        Ok(())
    }
}

/// Read credentials from `NOLOCO_ACCOUNT_KEY` and `NOLOCO_APP_KEY`
pub fn credentials_from_env() -> Result<Credentials> {
    credentials_from(|name| std::env::var(name).ok())
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let read = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .with_context(|| format!("{} is not set", name))
    };
    Ok(Credentials {
        account_key: read(ACCOUNT_KEY_VAR)?,
        app_key: read(APP_KEY_VAR)?,
    })
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn page_cap(mut self, cap: usize) -> Self {
        self.config.api.page_cap = cap;
        self
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.config.api.continue_on_fail = enabled;
        self
    }

    pub fn default_app(mut self, app: impl Into<String>) -> Self {
        self.config.defaults.app = Some(app.into());
        self
    }

    pub fn default_table(mut self, table: impl Into<String>) -> Self {
        self.config.defaults.table = Some(table.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
