//! End-to-end runs through the library with a scripted process runner.

use std::path::Path;
use std::sync::Arc;

use checksb::cli::Cli;
use checksb::compare::Verdict;
use checksb::config::Config;
use checksb::engine::{MockRunner, ProcessOutput};
use checksb::error::CheckError;
use checksb::orchestrator::{exit_code, Orchestrator, RunMode, EXIT_MISMATCH};
use checksb::report::TextReport;
use clap::Parser;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::common::write_case;

const CHECK: &str = "\
-- SEL-1: first value
SELECT v FROM t WHERE id = 1;
-- SEL-2: row count
SELECT COUNT(*) FROM t;
";

fn settings(sql_dir: &Path, extra: &[&str]) -> checksb::config::RunSettings {
    let sql_dir = sql_dir.display().to_string();
    let mut args = vec![
        "checksb",
        "--database",
        "itest",
        "--case",
        "merge",
        "--sql-dir",
        sql_dir.as_str(),
    ];
    args.extend_from_slice(extra);
    Cli::parse_from(args).resolve(&Config::default()).unwrap()
}

#[tokio::test]
async fn test_full_run_all_checks_pass() {
    let dir = tempdir().unwrap();
    let sql_dir = dir.path().to_path_buf();
    write_case(&sql_dir, "merge", CHECK);

    let runner = Arc::new(
        MockRunner::new()
            .respond(
                "DROP DATABASE itest",
                ProcessOutput::stderr("Unknown database itest"),
            )
            .respond(
                "-- SEL-1: first value\nSELECT v FROM t WHERE id = 1",
                ProcessOutput::stdout("6\n"),
            )
            .respond(
                "-- SEL-2: row count\nSELECT COUNT(*) FROM t",
                ProcessOutput::stdout("1\n"),
            ),
    );
    let settings = settings(&sql_dir, &[]);
    let mut orchestrator = Orchestrator::from_settings(
        &settings,
        runner.clone(),
        Box::new(TextReport::new(Vec::new())),
    );

    let summary = orchestrator.run(settings.mode).await.unwrap();

    let passed: Vec<&str> = summary
        .passed
        .iter()
        .map(|record| record.identifier.as_str())
        .collect();
    assert_eq!(passed, vec!["SEL-1", "SEL-2"]);
    assert!(summary.failed.is_empty());
    assert_eq!(exit_code(&summary, true), 0);

    let bend = runner.statements_for("bendsql");
    assert_eq!(bend[0], "DROP DATABASE itest");
    assert_eq!(bend[1], "CREATE DATABASE itest");

    let warehouse = ["--warehouse".to_string(), "COMPUTE_WH".to_string()];
    let snow_calls: Vec<_> = runner
        .calls()
        .into_iter()
        .filter(|call| call.invocation.program == "snowsql")
        .collect();
    assert_eq!(snow_calls.len(), 7);
    assert!(snow_calls
        .iter()
        .all(|call| call.invocation.args.ends_with(&warehouse)));
}

#[tokio::test]
async fn test_check_only_reports_mismatch() {
    let dir = tempdir().unwrap();
    let sql_dir = dir.path().to_path_buf();
    write_case(&sql_dir, "merge", CHECK);

    let first = "-- SEL-1: first value\nSELECT v FROM t WHERE id = 1";
    let runner = Arc::new(
        MockRunner::new()
            .respond_for("bendsql", first, ProcessOutput::stdout("5\n"))
            .respond_for("snowsql", first, ProcessOutput::stdout("6\n")),
    );
    let settings = settings(&sql_dir, &["--run-check-only", "--fail-on-mismatch"]);
    assert_eq!(settings.mode, RunMode::CheckOnly);

    let mut orchestrator = Orchestrator::from_settings(
        &settings,
        runner.clone(),
        Box::new(TextReport::new(Vec::new())),
    );
    let summary = orchestrator.run(settings.mode).await.unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.passed.len(), 1);
    let failed = &summary.failed[0];
    assert_eq!(failed.identifier.as_str(), "SEL-1");
    assert_eq!(failed.verdict, Verdict::Mismatch);
    assert_eq!(failed.left.output, "5\n");
    assert_eq!(failed.right.output, "6\n");
    assert_eq!(exit_code(&summary, settings.fail_on_mismatch), EXIT_MISMATCH);

    // No provisioning in check-only mode.
    assert_eq!(runner.calls().len(), 4);
}

#[tokio::test]
async fn test_unknown_function_aborts_run() {
    let dir = tempdir().unwrap();
    let sql_dir = dir.path().to_path_buf();
    write_case(&sql_dir, "merge", CHECK);

    let runner = Arc::new(MockRunner::new().respond_for(
        "snowsql",
        "UPDATE t SET v = v + 1 WHERE id = 1",
        ProcessOutput::stdout("Unknown function v"),
    ));
    let settings = settings(&sql_dir, &["--runsnow"]);
    let mut orchestrator = Orchestrator::from_settings(
        &settings,
        runner.clone(),
        Box::new(TextReport::new(Vec::new())),
    );

    let err = orchestrator.run(settings.mode).await.unwrap_err();

    match err {
        CheckError::Fatal { engine, output, .. } => {
            assert_eq!(engine, "snowsql");
            assert_eq!(output, "Unknown function v");
        }
        other => panic!("Expected Fatal error, got {other:?}"),
    }
    assert!(runner.statements_for("bendsql").is_empty());
}

#[tokio::test]
async fn test_missing_case_is_fixture_error() {
    let dir = tempdir().unwrap();
    let sql_dir = dir.path().to_path_buf();

    let runner = Arc::new(MockRunner::new());
    let settings = settings(&sql_dir, &[]);
    let mut orchestrator = Orchestrator::from_settings(
        &settings,
        runner.clone(),
        Box::new(TextReport::new(Vec::new())),
    );

    let err = orchestrator.run(settings.mode).await.unwrap_err();
    assert!(matches!(err, CheckError::Fixture { .. }));
    assert!(err.to_string().contains("4 fixtures not found"));
    assert!(runner.calls().is_empty());
}
