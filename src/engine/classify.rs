//! Classification of raw engine output.
//!
//! Engines report failures as free text, often with a zero exit status, so the
//! verdict comes from substring matching on stdout/stderr together with the
//! shape of the statement that produced them.

use std::fmt;

use super::process::ProcessOutput;

/// How an engine's response to one statement is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The statement ran and its stdout is the result text.
    Success,
    /// The engine reported an error that is expected and must not fail the run.
    ToleratedError,
    /// The engine reported an unexpected error; the run must stop.
    FatalError,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::ToleratedError => write!(f, "tolerated error"),
            Self::FatalError => write!(f, "fatal error"),
        }
    }
}

/// Decides the [`Classification`] of a finished invocation.
pub trait OutputClassifier: Send + Sync {
    fn classify(&self, statement: &str, output: &ProcessOutput) -> Classification;
}

/// Returns true if the statement drops a database.
pub fn is_drop_database(statement: &str) -> bool {
    let normalized = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    normalized.to_uppercase().contains("DROP DATABASE")
}

/// Substring-based classifier shared by both engines.
///
/// All markers are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct SubstringClassifier {
    /// Phrases that mark a drop of a database that does not exist.
    pub missing_database: Vec<String>,
    /// Markers searched in stdout and stderr.
    pub error_markers: Vec<String>,
    /// Markers searched in stdout only.
    pub stdout_error_markers: Vec<String>,
}

impl Default for SubstringClassifier {
    fn default() -> Self {
        Self {
            missing_database: vec!["unknown database".to_string()],
            error_markers: vec!["error".to_string()],
            stdout_error_markers: vec!["unknown function".to_string()],
        }
    }
}

impl SubstringClassifier {
    /// Adds a marker searched in both streams.
    pub fn with_error_marker(mut self, marker: impl Into<String>) -> Self {
        self.error_markers.push(marker.into());
        self
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

impl OutputClassifier for SubstringClassifier {
    fn classify(&self, statement: &str, output: &ProcessOutput) -> Classification {
        let drop_database = is_drop_database(statement);

        if drop_database && contains_any(&output.combined(), &self.missing_database) {
            return Classification::ToleratedError;
        }

        let failed = contains_any(&output.stdout, &self.error_markers)
            || contains_any(&output.stderr, &self.error_markers)
            || contains_any(&output.stdout, &self.stdout_error_markers);

        if failed {
            // Errors while dropping a database are never fatal.
            if drop_database {
                Classification::ToleratedError
            } else {
                Classification::FatalError
            }
        } else {
            Classification::Success
        }
    }
}
