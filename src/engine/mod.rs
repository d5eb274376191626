//! Engine adapters.
//!
//! An [`EngineAdapter`] combines an engine's dialect (how its client is
//! invoked and how its databases are reset), an output classifier and a
//! process runner. Shared logic only ever sees the adapter, never an engine
//! name.

mod classify;
mod dialect;
mod mock;
mod process;

pub use classify::{is_drop_database, Classification, OutputClassifier, SubstringClassifier};
pub use dialect::{
    BendSql, EngineDialect, ProvisionPlan, ProvisionStep, SnowSql, DEFAULT_BOOTSTRAP_DATABASE,
    DEFAULT_SCHEMA,
};
pub use mock::{MockRunner, RecordedCall};
pub use process::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::error::{CheckError, Result};
use crate::script::preview;

/// Where statements for one engine are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTarget {
    /// Client binary to invoke.
    pub program: String,
    /// Database the statements run in.
    pub database: String,
    /// Compute warehouse, for engines that have one.
    pub warehouse: Option<String>,
}

impl EngineTarget {
    /// Creates a target without a warehouse.
    pub fn new(program: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            database: database.into(),
            warehouse: None,
        }
    }

    /// Sets the warehouse.
    pub fn with_warehouse(mut self, warehouse: Option<String>) -> Self {
        self.warehouse = warehouse;
        self
    }

    /// Same client and warehouse, different database.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            program: self.program.clone(),
            database: database.into(),
            warehouse: self.warehouse.clone(),
        }
    }
}

/// Outcome of one statement on one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Engine name.
    pub engine: String,
    /// The statement as sent.
    pub statement: String,
    /// Result text (the client's stdout).
    pub output: String,
    pub classification: Classification,
    pub elapsed: Duration,
}

/// Executes statements against one engine and classifies the output.
pub struct EngineAdapter {
    dialect: Box<dyn EngineDialect>,
    classifier: Arc<dyn OutputClassifier>,
    runner: Arc<dyn ProcessRunner>,
}

impl EngineAdapter {
    /// Creates an adapter using the default substring classifier.
    pub fn new(dialect: Box<dyn EngineDialect>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            dialect,
            classifier: Arc::new(SubstringClassifier::default()),
            runner,
        }
    }

    /// Replaces the output classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn OutputClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Engine name.
    pub fn name(&self) -> &str {
        self.dialect.name()
    }

    pub fn dialect(&self) -> &dyn EngineDialect {
        self.dialect.as_ref()
    }

    /// Runs one statement against `target`.
    ///
    /// Returns an error for fatal classifications and for clients that cannot
    /// be launched; tolerated errors come back as results.
    pub async fn execute(&self, statement: &str, target: &EngineTarget) -> Result<ExecutionResult> {
        let invocation = self.dialect.invocation(statement, target);
        info!(
            engine = self.name(),
            "Executing command: {}",
            command_line(&invocation, statement)
        );

        let start = Instant::now();
        let output = self.runner.run(&invocation).await.inspect_err(|e| {
            error!(engine = self.name(), "{e}");
        })?;
        let elapsed = start.elapsed();

        let classification = self.classifier.classify(statement, &output);
        debug!(engine = self.name(), %classification, "Classified output");
        match classification {
            Classification::Success => {
                info!(
                    engine = self.name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Command executed successfully"
                );
                debug!(engine = self.name(), "Output:\n{}", output.stdout);
            }
            Classification::ToleratedError => {
                warn!(
                    engine = self.name(),
                    "Tolerated error for `{}`: {}",
                    preview(statement),
                    output.combined().trim()
                );
            }
            Classification::FatalError => {
                let offending = if output.stdout.is_empty() {
                    output.stderr
                } else {
                    output.stdout
                };
                error!(
                    engine = self.name(),
                    "Error detected in command output: {}",
                    offending.trim()
                );
                return Err(CheckError::fatal(self.name(), statement, offending));
            }
        }

        Ok(ExecutionResult {
            engine: self.name().to_string(),
            statement: statement.to_string(),
            output: output.stdout,
            classification,
            elapsed,
        })
    }
}

/// Renders an invocation for logs with only the statement shortened.
fn command_line(invocation: &Invocation, statement: &str) -> String {
    if statement.is_empty() {
        return invocation.to_string();
    }
    let shown = preview(statement);
    let mut line = invocation.program.clone();
    for arg in &invocation.args {
        line.push(' ');
        line.push_str(&arg.replace(statement, &shown));
    }
    line
}

/// An adapter bound to the target it runs against for the whole run.
pub struct Engine {
    pub adapter: EngineAdapter,
    pub target: EngineTarget,
}

impl Engine {
    pub fn new(adapter: EngineAdapter, target: EngineTarget) -> Self {
        Self { adapter, target }
    }

    /// Engine name.
    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// Runs one statement against the bound target.
    pub async fn execute(&self, statement: &str) -> Result<ExecutionResult> {
        self.adapter.execute(statement, &self.target).await
    }
}
