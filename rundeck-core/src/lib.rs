//! Rundeck Core
//!
//! Core types and pure logic for notifying Rundeck from a CI build.
//!
//! This crate contains:
//! - Domain types: jobs, executions and CI builds
//! - DTOs: the job run request
//! - Option parsing: `key=value` text blocks into job options
//! - Tag matching: whether a build's commits ask for a notification

pub mod domain;
pub mod dto;
pub mod options;
pub mod tags;
