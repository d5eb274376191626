//! Run reporting.
//!
//! Comparison and orchestration code describe what happened through
//! [`RunEvent`]s; a [`ReportSink`] decides how that is presented. The
//! orchestrator owns exactly one sink for the whole run.

mod json;
mod text;

pub use json::JsonReport;
pub use text::TextReport;

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::compare::{ComparisonRecord, RunSummary};
use crate::error::{CheckError, Result};
use crate::script::TestIdentifier;

/// Which fixture a script run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Action,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Action => write!(f, "action"),
        }
    }
}

/// Progress of a run, independent of presentation.
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    /// An engine's database is being reset.
    Provisioning { engine: &'a str, database: &'a str },
    /// A setup or action fixture is being run on one engine.
    Script {
        engine: &'a str,
        stage: Stage,
        path: &'a Path,
    },
    /// A check statement is about to run on both engines.
    Preparing { identifier: &'a TestIdentifier },
    /// A check statement has been compared.
    Compared(&'a ComparisonRecord),
}

/// Receives run progress and the final summary.
pub trait ReportSink {
    fn event(&mut self, event: RunEvent<'_>) -> Result<()>;

    fn summary(&mut self, summary: &RunSummary) -> Result<()>;
}

/// Report format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable progress and summary.
    #[default]
    Text,
    /// A single JSON document written once the run is over.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Builds the sink for a format, writing to stdout or to `output_file`.
pub fn sink_for(
    format: OutputFormat,
    output_file: Option<&PathBuf>,
) -> Result<Box<dyn ReportSink>> {
    let writer: Box<dyn Write> = match output_file {
        Some(path) => Box::new(File::create(path).map_err(|e| {
            CheckError::report(format!("Cannot create {}: {e}", path.display()))
        })?),
        None => Box::new(io::stdout()),
    };

    Ok(match format {
        OutputFormat::Text => Box::new(TextReport::new(writer)),
        OutputFormat::Json => Box::new(JsonReport::new(writer)),
    })
}

pub(crate) fn write_error(e: io::Error) -> CheckError {
    CheckError::report(format!("Failed to write report: {e}"))
}
