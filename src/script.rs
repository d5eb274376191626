//! SQL fixture handling.
//!
//! Fixtures are split on `;` into trimmed, non-empty statements. A `;` inside
//! a string literal or comment also splits; fixtures are written to avoid it.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::engine::{Engine, ExecutionResult};
use crate::error::{CheckError, Result};

/// Statement terminator.
pub const TERMINATOR: char = ';';

/// Maximum statement length shown in log lines.
const PREVIEW_LEN: usize = 100;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--\s*([\w-]+):").expect("identifier pattern is valid"));

/// Label naming one check statement in reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct TestIdentifier(String);

impl TestIdentifier {
    /// Identifier used when a statement carries no `-- TOKEN:` comment.
    pub const UNKNOWN: &'static str = "Unknown Query";

    /// Extracts the first `-- TOKEN:` label from a statement.
    pub fn extract(statement: &str) -> Self {
        IDENTIFIER_RE
            .captures(statement)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().trim().to_string()))
            .unwrap_or_else(Self::unknown)
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One statement from a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatement {
    pub text: String,
    pub identifier: TestIdentifier,
}

impl QueryStatement {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let identifier = TestIdentifier::extract(&text);
        Self { text, identifier }
    }
}

/// Splits fixture source into statements, preserving order.
pub fn split_statements(source: &str) -> Vec<String> {
    source
        .split(TERMINATOR)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(String::from)
        .collect()
}

/// Splits fixture source and labels each statement.
pub fn parse_statements(source: &str) -> Vec<QueryStatement> {
    split_statements(source)
        .into_iter()
        .map(QueryStatement::new)
        .collect()
}

/// Reads and parses a fixture file.
pub fn load_fixture(path: &Path) -> Result<Vec<QueryStatement>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| CheckError::fixture(path, format!("Failed to read fixture: {e}")))?;
    Ok(parse_statements(&source))
}

/// Shortens a statement for log output.
pub fn preview(statement: &str) -> String {
    let flat = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_LEN {
        flat
    } else {
        let head: String = flat.chars().take(PREVIEW_LEN).collect();
        format!("{head}...")
    }
}

/// Executes every statement of a fixture against one engine, in order.
///
/// Stops at the first fatal error.
pub async fn run_script(path: &Path, engine: &Engine) -> Result<Vec<ExecutionResult>> {
    info!(engine = engine.name(), "Executing SQL script: {}", path.display());
    let statements = load_fixture(path)?;

    let mut results = Vec::with_capacity(statements.len());
    for statement in &statements {
        results.push(engine.execute(&statement.text).await?);
    }

    info!(
        engine = engine.name(),
        statements = results.len(),
        "Finished SQL script: {}",
        path.display()
    );
    Ok(results)
}
