//! checksb - differential SQL testing across bendsql and snowsql.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod cli;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod provision;
pub mod report;
pub mod script;
