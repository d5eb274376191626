//! Tests that drive the checksb binary against stand-in client scripts.
//!
//! The scripts answer the check queries with fixed values and append every
//! statement they receive to a per-client log.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use super::common::write_case;

const CHECK: &str = "\
-- SEL-1: first value
SELECT v FROM t WHERE id = 1;
-- SEL-2: constant
SELECT 1;
";

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn sql_dir(&self) -> PathBuf {
        self.dir.path().join("sql")
    }

    fn client_log(&self, client: &str) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(format!("{client}.log")))
            .unwrap_or_default()
            .split('\u{1e}')
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn run(&self, extra: &[&str]) -> Output {
        let sql_dir = self.sql_dir();
        Command::new(env!("CARGO_BIN_EXE_checksb"))
            .arg("--config")
            .arg(&self.config)
            .args(["--database", "itest", "--case", "merge", "--sql-dir"])
            .arg(&sql_dir)
            .args(extra)
            .env_remove("BENDSQL_BIN")
            .env_remove("SNOWSQL_BIN")
            .env_remove("SNOWSQL_WAREHOUSE")
            .env("RUST_LOG", "warn")
            .output()
            .unwrap()
    }
}

#[cfg(unix)]
fn write_client(dir: &Path, name: &str, query_capture: &str, check_value: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join(format!("{name}.log"));
    let script = format!(
        r#"#!/bin/sh
q=""
while [ $# -gt 0 ]; do
  case "$1" in
    {query_capture}
  esac
  shift
done
printf '%s\036' "$q" >> "{log}"
case "$q" in
  *"SELECT v"*) echo {check_value} ;;
  *"SELECT 1"*) echo 1 ;;
esac
"#,
        log = log.display(),
    );

    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn workspace(bend_value: &str, snow_value: &str) -> Workspace {
    let dir = tempdir().unwrap();
    let bend = write_client(
        dir.path(),
        "bendsql",
        r#"--query=*) q="${1#--query=}" ;;"#,
        bend_value,
    );
    let snow = write_client(
        dir.path(),
        "snowsql",
        r#"--query) shift; q="$1" ;;"#,
        snow_value,
    );

    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[engines.bendsql]\nbinary = \"{}\"\n\n[engines.snowsql]\nbinary = \"{}\"\n",
            bend.display(),
            snow.display()
        ),
    )
    .unwrap();

    let workspace = Workspace { dir, config };
    write_case(&workspace.sql_dir(), "merge", CHECK);
    workspace
}

#[cfg(unix)]
#[test]
fn test_binary_full_run_matches() {
    let ws = workspace("6", "6");

    let output = ws.run(&[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert!(stdout.contains("OK - SEL-1"));
    assert!(stdout.contains("OK - SEL-2"));
    assert!(!stdout.contains("Failed Tests"));

    let bend = ws.client_log("bendsql");
    assert_eq!(bend[0], "DROP DATABASE itest");
    assert_eq!(bend[1], "CREATE DATABASE itest");
    assert_eq!(bend[2], "CREATE TABLE t (id INT, v INT)");

    let snow = ws.client_log("snowsql");
    assert_eq!(snow[0], "DROP DATABASE IF EXISTS itest");
    assert_eq!(snow[2], "CREATE TABLE t (id NUMBER, v NUMBER)");
}

#[cfg(unix)]
#[test]
fn test_binary_mismatch_exit_status() {
    let ws = workspace("5", "6");

    let output = ws.run(&["--run-check-only"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("DIFFERENCE FOUND"));
    assert!(stdout.contains("Test: SEL-1"));
    assert!(stdout.contains("OK - SEL-2"));

    let output = ws.run(&["--run-check-only", "--fail-on-mismatch"]);
    assert_eq!(output.status.code(), Some(2));

    // Check-only never provisions.
    assert!(!ws
        .client_log("bendsql")
        .iter()
        .any(|statement| statement.starts_with("DROP DATABASE")));
}

#[cfg(unix)]
#[test]
fn test_binary_json_report_to_file() {
    let ws = workspace("5", "6");
    let report = ws.dir.path().join("report.json");

    let output = ws.run(&[
        "--run-check-only",
        "--output",
        "json",
        "--output-file",
        report.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["passed_count"], 1);
    assert_eq!(json["failed_count"], 1);
    assert_eq!(json["failed"][0]["identifier"], "SEL-1");
    assert_eq!(json["failed"][0]["left"]["engine"], "bendsql");
    assert_eq!(json["failed"][0]["left"]["output"], "5\n");
    assert_eq!(json["failed"][0]["right"]["output"], "6\n");
}

#[cfg(unix)]
#[test]
fn test_binary_missing_case_fails() {
    let ws = workspace("1", "1");

    let output = Command::new(env!("CARGO_BIN_EXE_checksb"))
        .arg("--config")
        .arg(&ws.config)
        .args(["--database", "itest", "--case", "nope", "--sql-dir"])
        .arg(ws.sql_dir())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Fixture Error"), "stderr: {stderr}");
    assert!(ws.client_log("bendsql").is_empty());
}

#[test]
fn test_binary_requires_database_and_case() {
    let output = Command::new(env!("CARGO_BIN_EXE_checksb"))
        .args(["--case", "selects"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--database"));
}
