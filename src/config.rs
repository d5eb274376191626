//! Configuration management for checksb.
//!
//! Handles loading configuration from TOML files and environment variables.
//! Command-line arguments take precedence over the file, the file over the
//! environment, and the environment over built-in defaults.

use crate::engine::{DEFAULT_BOOTSTRAP_DATABASE, DEFAULT_SCHEMA};
use crate::error::{CheckError, Result};
use crate::orchestrator::RunMode;
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// bendsql client used when none is configured.
pub const DEFAULT_BENDSQL_BINARY: &str = "bendsql";

/// snowsql client used when none is configured.
pub const DEFAULT_SNOWSQL_BINARY: &str = "snowsql";

/// Warehouse used for snowsql when none is configured.
pub const DEFAULT_WAREHOUSE: &str = "COMPUTE_WH";

/// Main configuration structure for checksb.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Engine client settings.
    #[serde(default)]
    pub engines: EnginesConfig,

    /// Run defaults.
    #[serde(default)]
    pub run: RunConfig,
}

/// Client settings for both engines.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnginesConfig {
    #[serde(default)]
    pub bendsql: BendSqlConfig,

    #[serde(default)]
    pub snowsql: SnowSqlConfig,
}

/// bendsql client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BendSqlConfig {
    /// Client binary, `bendsql` on the PATH when unset.
    pub binary: Option<String>,

    /// Database used to connect while the target database is recreated.
    #[serde(default = "default_bootstrap_database")]
    pub bootstrap_database: String,
}

/// snowsql client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowSqlConfig {
    /// Client binary, `snowsql` on the PATH when unset.
    pub binary: Option<String>,

    /// Schema passed with `--schemaname`.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Compute warehouse.
    pub warehouse: Option<String>,
}

/// Run defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory holding one subdirectory of fixtures per case.
    #[serde(default = "default_sql_dir")]
    pub sql_dir: PathBuf,

    /// Exit with a failure status when any check mismatches.
    #[serde(default)]
    pub fail_on_mismatch: bool,
}

fn default_bootstrap_database() -> String {
    DEFAULT_BOOTSTRAP_DATABASE.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_sql_dir() -> PathBuf {
    PathBuf::from("sql")
}

impl Default for BendSqlConfig {
    fn default() -> Self {
        Self {
            binary: None,
            bootstrap_database: default_bootstrap_database(),
        }
    }
}

impl Default for SnowSqlConfig {
    fn default() -> Self {
        Self {
            binary: None,
            schema: default_schema(),
            warehouse: None,
        }
    }
}

impl BendSqlConfig {
    /// The client binary to invoke.
    pub fn binary(&self) -> &str {
        self.binary.as_deref().unwrap_or(DEFAULT_BENDSQL_BINARY)
    }
}

impl SnowSqlConfig {
    /// The client binary to invoke.
    pub fn binary(&self) -> &str {
        self.binary.as_deref().unwrap_or(DEFAULT_SNOWSQL_BINARY)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sql_dir: default_sql_dir(),
            fail_on_mismatch: false,
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("checksb")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CheckError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            CheckError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variables (BENDSQL_BIN, SNOWSQL_BIN, SNOWSQL_WAREHOUSE)
    /// to settings the file left unset.
    pub fn apply_env_defaults(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Same as [`Config::apply_env_defaults`] with an explicit lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.engines.bendsql.binary.is_none() {
            self.engines.bendsql.binary = lookup("BENDSQL_BIN");
        }
        if self.engines.snowsql.binary.is_none() {
            self.engines.snowsql.binary = lookup("SNOWSQL_BIN");
        }
        if self.engines.snowsql.warehouse.is_none() {
            self.engines.snowsql.warehouse = lookup("SNOWSQL_WAREHOUSE");
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub database: String,
    pub warehouse: String,
    pub case: String,
    pub sql_dir: PathBuf,
    pub mode: RunMode,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub fail_on_mismatch: bool,
    pub engines: EnginesConfig,
}

impl RunSettings {
    /// Directory holding this case's fixtures.
    pub fn case_dir(&self) -> PathBuf {
        self.sql_dir.join(&self.case)
    }
}
