//! Core domain types
//!
//! Jobs and executions mirror what the Rundeck server reports; builds
//! describe the CI side that triggers them.

pub mod build;
pub mod execution;
pub mod job;
