//! Error types for checksb.
//!
//! Defines the main error enum used throughout the harness. Only errors that
//! must unwind a run live here; tolerated engine errors and mismatches are
//! carried as data in execution results and comparison records.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for checksb operations.
#[derive(Error, Debug)]
pub enum CheckError {
    /// An engine reported an unexpected error for a statement that is not a
    /// database drop.
    #[error("{engine} failed on statement `{statement}`: {output}")]
    Fatal {
        engine: String,
        statement: String,
        output: String,
    },

    /// The engine client could not be launched at all.
    #[error("Could not run `{command}`: {message}")]
    Invocation { command: String, message: String },

    /// A fixture file is missing or unreadable.
    #[error("Fixture error ({}): {message}", path.display())]
    Fixture { path: PathBuf, message: String },

    /// Configuration errors (invalid config file, bad CLI values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The report could not be written.
    #[error("Report error: {0}")]
    Report(String),
}

impl CheckError {
    /// Creates a fatal engine error.
    pub fn fatal(
        engine: impl Into<String>,
        statement: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::Fatal {
            engine: engine.into(),
            statement: statement.into(),
            output: output.into(),
        }
    }

    /// Creates an invocation error for a command line that could not be run.
    pub fn invocation(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invocation {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a fixture error for the given path.
    pub fn fixture(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Fixture {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a report error with the given message.
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Fatal { .. } => "Engine Error",
            Self::Invocation { .. } => "Invocation Error",
            Self::Fixture { .. } => "Fixture Error",
            Self::Config(_) => "Configuration Error",
            Self::Report(_) => "Report Error",
        }
    }
}

/// Result type alias using CheckError.
pub type Result<T> = std::result::Result<T, CheckError>;
