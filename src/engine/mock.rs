//! Scripted process runner for testing.
//!
//! Answers client invocations from a table of canned outputs keyed by client
//! program and statement, and records every call it receives.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::process::{Invocation, ProcessOutput, ProcessRunner};
use crate::error::{CheckError, Result};

/// One invocation seen by a [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub invocation: Invocation,
    /// Statement recovered from the `--query` argument.
    pub statement: Option<String>,
}

impl RecordedCall {
    /// Database passed to the client (`-D` or `--dbname`).
    pub fn database(&self) -> Option<&str> {
        flag_value(&self.invocation.args, &["-D", "--dbname"])
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Output(ProcessOutput),
    LaunchFailure,
}

/// A process runner that never spawns anything.
///
/// Unmatched statements succeed with empty output.
#[derive(Debug, Default)]
pub struct MockRunner {
    any_program: HashMap<String, Reply>,
    per_program: HashMap<(String, String), Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `statement` with `output` on every client.
    pub fn respond(mut self, statement: &str, output: ProcessOutput) -> Self {
        self.any_program
            .insert(statement.to_string(), Reply::Output(output));
        self
    }

    /// Answers `statement` with `output` on the given client only.
    pub fn respond_for(mut self, program: &str, statement: &str, output: ProcessOutput) -> Self {
        self.per_program.insert(
            (program.to_string(), statement.to_string()),
            Reply::Output(output),
        );
        self
    }

    /// Makes `statement` fail as if the client binary could not be launched.
    pub fn fail_launch(mut self, statement: &str) -> Self {
        self.any_program
            .insert(statement.to_string(), Reply::LaunchFailure);
        self
    }

    /// Every invocation received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    /// Statements received so far by the given client, in order.
    pub fn statements_for(&self, program: &str) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|call| call.invocation.program == program)
            .filter_map(|call| call.statement.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn flag_value<'a>(args: &'a [String], flags: &[&str]) -> Option<&'a str> {
    args.windows(2)
        .find(|pair| flags.contains(&pair[0].as_str()))
        .map(|pair| pair[1].as_str())
}

fn query_of(invocation: &Invocation) -> Option<String> {
    invocation
        .args
        .iter()
        .find_map(|arg| arg.strip_prefix("--query="))
        .or_else(|| flag_value(&invocation.args, &["--query"]))
        .map(String::from)
}

#[async_trait]
impl ProcessRunner for MockRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let statement = query_of(invocation);
        self.lock().push(RecordedCall {
            invocation: invocation.clone(),
            statement: statement.clone(),
        });

        let reply = statement.as_ref().and_then(|stmt| {
            self.per_program
                .get(&(invocation.program.clone(), stmt.clone()))
                .or_else(|| self.any_program.get(stmt))
        });

        match reply {
            Some(Reply::Output(output)) => Ok(output.clone()),
            Some(Reply::LaunchFailure) => Err(CheckError::invocation(
                invocation.to_string(),
                "No such file or directory (os error 2)",
            )),
            None => Ok(ProcessOutput::stdout("")),
        }
    }
}
