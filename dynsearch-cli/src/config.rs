//! TOML configuration for the `dynsearch` binary.

use anyhow::{Context, Result};
use clap::ValueEnum;
use dynsearch_sql::{DEFAULT_MAX_DEPTH, WireFormat};
use serde::Deserialize;
use std::path::Path;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Postgres,
    Mysql,
}

/// Wire format as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WireArg {
    Tagged,
    Legacy,
}

impl From<WireArg> for WireFormat {
    fn from(arg: WireArg) -> Self {
        match arg {
            WireArg::Tagged => Self::Tagged,
            WireArg::Legacy => Self::Legacy,
        }
    }
}

/// Settings loaded from the config file, then overridden by flags.
///
/// ```toml
/// dialect = "mysql"
/// wire_format = "legacy"
/// max_depth = 16
/// escape_like = true
/// paging = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub dialect: DialectKind,
    pub wire_format: WireFormat,
    pub max_depth: usize,
    pub escape_like: bool,
    pub paging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Postgres,
            wire_format: WireFormat::Tagged,
            max_depth: DEFAULT_MAX_DEPTH,
            escape_like: false,
            paging: true,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("failed to load config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?settings, "loaded configuration");
        Ok(settings)
    }
}
