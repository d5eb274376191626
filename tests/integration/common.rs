//! Common test utilities.

use std::fs;
use std::path::{Path, PathBuf};

/// Writes a case directory with the standard fixture layout.
pub fn write_case(sql_dir: &Path, case: &str, check: &str) -> PathBuf {
    let case_dir = sql_dir.join(case);
    fs::create_dir_all(case_dir.join("bend")).unwrap();
    fs::create_dir_all(case_dir.join("snow")).unwrap();
    fs::write(
        case_dir.join("bend/setup.sql"),
        "CREATE TABLE t (id INT, v INT);",
    )
    .unwrap();
    fs::write(
        case_dir.join("snow/setup.sql"),
        "CREATE TABLE t (id NUMBER, v NUMBER);",
    )
    .unwrap();
    fs::write(
        case_dir.join("action.sql"),
        "INSERT INTO t VALUES (1, 5);\nUPDATE t SET v = v + 1 WHERE id = 1;\n",
    )
    .unwrap();
    fs::write(case_dir.join("check.sql"), check).unwrap();
    case_dir
}
