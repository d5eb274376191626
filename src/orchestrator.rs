//! Run orchestration.
//!
//! A run is one linear pipeline chosen up front: reset and populate the
//! selected engines' databases, then compare both engines on the check
//! fixture and hand the summary to the report sink.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::compare::{compare_all, RunSummary};
use crate::config::RunSettings;
use crate::engine::{BendSql, Engine, EngineAdapter, EngineTarget, ProcessRunner, SnowSql};
use crate::error::{CheckError, Result};
use crate::provision::provision;
use crate::report::{ReportSink, RunEvent, Stage};
use crate::script::run_script;

/// Exit status for a run whose checks mismatched, when mismatches are set to fail.
pub const EXIT_MISMATCH: i32 = 2;

/// Which engines are set up before the check phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Compare against the existing databases.
    CheckOnly,
    /// Set up bendsql only.
    BendOnly,
    /// Set up snowsql only.
    SnowOnly,
    /// Set up bendsql, then snowsql.
    #[default]
    Both,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckOnly => write!(f, "check only"),
            Self::BendOnly => write!(f, "bendsql only"),
            Self::SnowOnly => write!(f, "snowsql only"),
            Self::Both => write!(f, "bendsql and snowsql"),
        }
    }
}

/// Fixture paths for one case.
///
/// ```text
/// <sql_dir>/<case>/bend/setup.sql
/// <sql_dir>/<case>/snow/setup.sql
/// <sql_dir>/<case>/action.sql
/// <sql_dir>/<case>/check.sql
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    case_dir: PathBuf,
}

impl FixtureSet {
    pub fn new(case_dir: impl Into<PathBuf>) -> Self {
        Self {
            case_dir: case_dir.into(),
        }
    }

    pub fn case_dir(&self) -> &Path {
        &self.case_dir
    }

    /// The engine's own setup fixture.
    pub fn setup(&self, engine: &Engine) -> PathBuf {
        self.case_dir
            .join(engine.adapter.dialect().setup_dir())
            .join("setup.sql")
    }

    pub fn action(&self) -> PathBuf {
        self.case_dir.join("action.sql")
    }

    pub fn check(&self) -> PathBuf {
        self.case_dir.join("check.sql")
    }
}

/// Returns an error naming every path that is not a file.
fn ensure_exist(paths: &[PathBuf]) -> Result<()> {
    let missing: Vec<&PathBuf> = paths.iter().filter(|p| !p.is_file()).collect();
    match missing.as_slice() {
        [] => Ok(()),
        [only] => Err(CheckError::fixture(*only, "not found")),
        [first, ..] => {
            let names = missing
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(CheckError::fixture(
                *first,
                format!("{} fixtures not found: {names}", missing.len()),
            ))
        }
    }
}

/// Drives a whole run over both engines.
pub struct Orchestrator {
    bend: Engine,
    snow: Engine,
    fixtures: FixtureSet,
    sink: Box<dyn ReportSink>,
}

impl Orchestrator {
    pub fn new(bend: Engine, snow: Engine, fixtures: FixtureSet, sink: Box<dyn ReportSink>) -> Self {
        Self {
            bend,
            snow,
            fixtures,
            sink,
        }
    }

    /// Builds both engines from resolved settings, sharing one process runner.
    pub fn from_settings(
        settings: &RunSettings,
        runner: Arc<dyn ProcessRunner>,
        sink: Box<dyn ReportSink>,
    ) -> Self {
        let bend_config = &settings.engines.bendsql;
        let snow_config = &settings.engines.snowsql;

        let bend = Engine::new(
            EngineAdapter::new(
                Box::new(BendSql {
                    bootstrap_database: bend_config.bootstrap_database.clone(),
                }),
                runner.clone(),
            ),
            EngineTarget::new(bend_config.binary(), &settings.database),
        );
        let snow = Engine::new(
            EngineAdapter::new(
                Box::new(SnowSql {
                    schema: snow_config.schema.clone(),
                }),
                runner,
            ),
            EngineTarget::new(snow_config.binary(), &settings.database)
                .with_warehouse(Some(settings.warehouse.clone())),
        );

        Self::new(bend, snow, FixtureSet::new(settings.case_dir()), sink)
    }

    /// Every fixture the mode reads.
    pub fn required_fixtures(&self, mode: RunMode) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for engine in pipelines(mode, &self.bend, &self.snow) {
            for path in [self.fixtures.setup(engine), self.fixtures.action()] {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths.push(self.fixtures.check());
        paths
    }

    /// Runs the pipeline for `mode` and reports the summary.
    pub async fn run(&mut self, mode: RunMode) -> Result<RunSummary> {
        info!(
            "Running case {} ({mode})",
            self.fixtures.case_dir().display()
        );
        ensure_exist(&self.required_fixtures(mode))?;

        let Self {
            bend,
            snow,
            fixtures,
            sink,
        } = self;

        for engine in pipelines(mode, bend, snow) {
            prepare(engine, fixtures, &mut **sink).await?;
        }

        let summary = compare_all(&fixtures.check(), bend, snow, &mut **sink).await?;
        sink.summary(&summary)?;
        Ok(summary)
    }
}

/// Engines set up before the check phase, in order.
fn pipelines<'a>(mode: RunMode, bend: &'a Engine, snow: &'a Engine) -> Vec<&'a Engine> {
    match mode {
        RunMode::CheckOnly => vec![],
        RunMode::BendOnly => vec![bend],
        RunMode::SnowOnly => vec![snow],
        RunMode::Both => vec![bend, snow],
    }
}

/// Provisions one engine and runs its setup and action fixtures.
async fn prepare(engine: &Engine, fixtures: &FixtureSet, sink: &mut dyn ReportSink) -> Result<()> {
    info!(engine = engine.name(), "Setting up and executing scripts");
    sink.event(RunEvent::Provisioning {
        engine: engine.name(),
        database: &engine.target.database,
    })?;
    provision(engine).await?;

    for (stage, path) in [
        (Stage::Setup, fixtures.setup(engine)),
        (Stage::Action, fixtures.action()),
    ] {
        sink.event(RunEvent::Script {
            engine: engine.name(),
            stage,
            path: &path,
        })?;
        run_script(&path, engine).await?;
    }
    Ok(())
}

/// Process exit status for a finished run.
pub fn exit_code(summary: &RunSummary, fail_on_mismatch: bool) -> i32 {
    if fail_on_mismatch && !summary.is_success() {
        EXIT_MISMATCH
    } else {
        0
    }
}
