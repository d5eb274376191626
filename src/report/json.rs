//! JSON report.

use std::io::Write;

use serde::Serialize;

use super::{write_error, ReportSink, RunEvent};
use crate::compare::{ComparisonRecord, RunSummary};
use crate::error::{CheckError, Result};
use crate::script::TestIdentifier;

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    passed_count: usize,
    failed_count: usize,
    total_elapsed_ms: u64,
    passed: Vec<PassedTest<'a>>,
    failed: Vec<FailedTest<'a>>,
}

#[derive(Debug, Serialize)]
struct PassedTest<'a> {
    identifier: &'a TestIdentifier,
    statement: &'a str,
    elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
struct FailedTest<'a> {
    identifier: &'a TestIdentifier,
    statement: &'a str,
    elapsed_ms: u64,
    left: EngineOutput<'a>,
    right: EngineOutput<'a>,
}

#[derive(Debug, Serialize)]
struct EngineOutput<'a> {
    engine: &'a str,
    output: &'a str,
}

impl<'a> From<&'a ComparisonRecord> for PassedTest<'a> {
    fn from(record: &'a ComparisonRecord) -> Self {
        Self {
            identifier: &record.identifier,
            statement: &record.statement,
            elapsed_ms: record.elapsed.as_millis() as u64,
        }
    }
}

impl<'a> From<&'a ComparisonRecord> for FailedTest<'a> {
    fn from(record: &'a ComparisonRecord) -> Self {
        Self {
            identifier: &record.identifier,
            statement: &record.statement,
            elapsed_ms: record.elapsed.as_millis() as u64,
            left: EngineOutput {
                engine: &record.left.engine,
                output: &record.left.output,
            },
            right: EngineOutput {
                engine: &record.right.engine,
                output: &record.right.output,
            },
        }
    }
}

/// Writes one JSON document describing the whole run.
///
/// Progress events are left to the log.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn event(&mut self, _event: RunEvent<'_>) -> Result<()> {
        Ok(())
    }

    fn summary(&mut self, summary: &RunSummary) -> Result<()> {
        let document = JsonOutput {
            passed_count: summary.passed.len(),
            failed_count: summary.failed.len(),
            total_elapsed_ms: summary.total_elapsed.as_millis() as u64,
            passed: summary.passed.iter().map(PassedTest::from).collect(),
            failed: summary.failed.iter().map(FailedTest::from).collect(),
        };

        serde_json::to_writer_pretty(&mut self.out, &document)
            .map_err(|e| CheckError::report(format!("Failed to serialize report: {e}")))?;
        writeln!(self.out).map_err(write_error)?;
        self.out.flush().map_err(write_error)
    }
}
