//! Command-line argument parsing for checksb.

use crate::config::{Config, RunSettings, DEFAULT_WAREHOUSE};
use crate::error::{CheckError, Result};
use crate::orchestrator::RunMode;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Compare SQL execution on bendsql and snowsql.
#[derive(Parser, Debug)]
#[command(name = "checksb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database name used on both engines
    #[arg(long, value_name = "DATABASE")]
    pub database: String,

    /// Warehouse name for snowsql [default: COMPUTE_WH]
    #[arg(long, value_name = "WAREHOUSE")]
    pub warehouse: Option<String>,

    /// Case to execute (e.g., selects, mergeinto, streams, updates, deletes)
    #[arg(long, value_name = "CASE")]
    pub case: String,

    /// Run only check.sql against the existing databases
    #[arg(long)]
    pub run_check_only: bool,

    /// Run only bendsql setup and action before the check
    #[arg(long)]
    pub runbend: bool,

    /// Run only snowsql setup and action before the check
    #[arg(long)]
    pub runsnow: bool,

    /// Directory holding the per-case fixture directories [default: sql]
    #[arg(long, value_name = "PATH")]
    pub sql_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report format (text or json)
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Exit with status 2 when any check mismatches
    #[arg(long)]
    pub fail_on_mismatch: bool,

    /// Also write logs to a file (default location when no path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub log_file: Option<Option<PathBuf>>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Selected run mode. `--run-check-only` wins over `--runbend`, which
    /// wins over `--runsnow`.
    pub fn mode(&self) -> RunMode {
        if self.run_check_only {
            RunMode::CheckOnly
        } else if self.runbend {
            RunMode::BendOnly
        } else if self.runsnow {
            RunMode::SnowOnly
        } else {
            RunMode::Both
        }
    }

    /// Parses the report format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }

    /// Merges the arguments with a loaded config into the settings for a run.
    pub fn resolve(&self, config: &Config) -> Result<RunSettings> {
        if self.database.trim().is_empty() {
            return Err(CheckError::config("--database must not be empty"));
        }
        if self.case.trim().is_empty() {
            return Err(CheckError::config("--case must not be empty"));
        }

        let output_format = self.parse_output_format().map_err(CheckError::config)?;

        let warehouse = self
            .warehouse
            .clone()
            .or_else(|| config.engines.snowsql.warehouse.clone())
            .unwrap_or_else(|| DEFAULT_WAREHOUSE.to_string());

        Ok(RunSettings {
            database: self.database.clone(),
            warehouse,
            case: self.case.clone(),
            sql_dir: self
                .sql_dir
                .clone()
                .unwrap_or_else(|| config.run.sql_dir.clone()),
            mode: self.mode(),
            output_format,
            output_file: self.output_file.clone(),
            fail_on_mismatch: self.fail_on_mismatch || config.run.fail_on_mismatch,
            engines: config.engines.clone(),
        })
    }
}
