//! Plain-text report.

use std::io::{self, Write};

use super::{write_error, ReportSink, RunEvent};
use crate::compare::{RunSummary, Verdict};
use crate::error::Result;

/// Writes progress as it happens and a pass/fail summary at the end.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn event(&mut self, event: RunEvent<'_>) -> Result<()> {
        write_event(&mut self.out, event).map_err(write_error)
    }

    fn summary(&mut self, summary: &RunSummary) -> Result<()> {
        write_summary(&mut self.out, summary).map_err(write_error)
    }
}

fn write_event<W: Write>(out: &mut W, event: RunEvent<'_>) -> io::Result<()> {
    match event {
        RunEvent::Provisioning { engine, database } => {
            writeln!(out, "Setting up database '{database}' on {engine}...")
        }
        RunEvent::Script {
            engine,
            stage,
            path,
        } => writeln!(out, "Running {stage} script {} on {engine}...", path.display()),
        RunEvent::Preparing { identifier } => writeln!(out, "Preparing to run {identifier}..."),
        RunEvent::Compared(record) => match record.verdict {
            Verdict::Match => {
                writeln!(out, "OK - {}", record.identifier)?;
                writeln!(out, "{}", record.left.output)
            }
            Verdict::Mismatch => {
                writeln!(out, "DIFFERENCE FOUND\n")?;
                writeln!(out, "{}:\n{}", record.identifier, record.statement)?;
                writeln!(out, "Differences:\n")?;
                writeln!(out, "{}:\n{}", record.left.engine, record.left.output)?;
                writeln!(out, "{}:\n{}", record.right.engine, record.right.output)
            }
        },
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    if !summary.passed.is_empty() {
        writeln!(out, "\nPassed Tests:")?;
        for record in &summary.passed {
            writeln!(
                out,
                "OK - {} ({:.2}s)",
                record.identifier,
                record.elapsed.as_secs_f64()
            )?;
        }
    }

    if !summary.failed.is_empty() {
        writeln!(out, "\nFailed Tests and their differences:")?;
        for record in &summary.failed {
            writeln!(out, "Test: {}", record.identifier)?;
            writeln!(out, "{} result:\n{}", record.left.engine, record.left.output)?;
            writeln!(out, "{} result:\n{}", record.right.engine, record.right.output)?;
        }
    }

    writeln!(
        out,
        "\nTotal Time: {:.2}s",
        summary.total_elapsed.as_secs_f64()
    )?;
    out.flush()
}
