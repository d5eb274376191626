//! Integration tests for checksb.

pub mod cli_test;
pub mod common;
pub mod run_test;
