//! Differential comparison of two engines.
//!
//! Every statement of the check fixture runs on the left engine, then on the
//! right engine, and the two result texts are compared as plain strings. No
//! whitespace, numeric or row-order normalization is applied: fixtures must
//! make both engines print identical text for identical data.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::{Engine, ExecutionResult};
use crate::error::Result;
use crate::report::{ReportSink, RunEvent};
use crate::script::{load_fixture, QueryStatement, TestIdentifier};

/// Outcome of comparing one statement across engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    Mismatch,
}

/// Compares two result texts.
pub fn verdict(left: &str, right: &str) -> Verdict {
    if left == right {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

/// One check statement run on both engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    pub identifier: TestIdentifier,
    pub statement: String,
    pub verdict: Verdict,
    pub left: ExecutionResult,
    pub right: ExecutionResult,
    /// Wall time spanning both executions.
    pub elapsed: Duration,
}

/// Everything a check phase produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: Vec<ComparisonRecord>,
    pub failed: Vec<ComparisonRecord>,
    pub total_elapsed: Duration,
}

impl RunSummary {
    /// True when no statement mismatched.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of compared statements.
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    fn record(&mut self, record: ComparisonRecord) {
        match record.verdict {
            Verdict::Match => self.passed.push(record),
            Verdict::Mismatch => self.failed.push(record),
        }
    }
}

/// Runs one statement on both engines and compares the results.
pub async fn compare_statement(
    statement: &QueryStatement,
    left: &Engine,
    right: &Engine,
) -> Result<ComparisonRecord> {
    let start = Instant::now();
    let left_result = left.execute(&statement.text).await?;
    let right_result = right.execute(&statement.text).await?;
    let elapsed = start.elapsed();

    Ok(ComparisonRecord {
        identifier: statement.identifier.clone(),
        statement: statement.text.clone(),
        verdict: verdict(&left_result.output, &right_result.output),
        left: left_result,
        right: right_result,
        elapsed,
    })
}

/// Runs the check fixture against both engines.
///
/// Mismatches are recorded and never stop the run; fatal engine errors do.
pub async fn compare_all(
    check_path: &Path,
    left: &Engine,
    right: &Engine,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    let started = Instant::now();
    let statements = load_fixture(check_path)?;
    info!(
        statements = statements.len(),
        "Comparing {} against {} using {}",
        left.name(),
        right.name(),
        check_path.display()
    );

    let mut summary = RunSummary::default();
    for statement in &statements {
        sink.event(RunEvent::Preparing {
            identifier: &statement.identifier,
        })?;

        let record = compare_statement(statement, left, right).await?;
        if record.verdict == Verdict::Mismatch {
            warn!(identifier = %record.identifier, "Difference found");
        }
        sink.event(RunEvent::Compared(&record))?;
        summary.record(record);
    }

    summary.total_elapsed = started.elapsed();
    info!(
        total = summary.total(),
        passed = summary.passed.len(),
        failed = summary.failed.len(),
        "Check phase finished"
    );
    Ok(summary)
}
