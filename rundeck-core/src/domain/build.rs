//! CI build domain types
//!
//! A build as seen by the notifier: its outcome, its workspace, the commits
//! it picked up and, when another build triggered it, that upstream build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A finished CI build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub job_name: String,
    pub number: u64,
    /// Display name including the job, e.g. `my-project #12`
    #[serde(default)]
    pub full_display_name: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub result: BuildResult,
    #[serde(default)]
    pub change_set: Vec<ChangeEntry>,
    /// Build that caused this one
    #[serde(default)]
    pub upstream: Option<Box<BuildInfo>>,
    /// Extra environment made available to option placeholders
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Outcome of a CI build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildResult {
    #[default]
    Success,
    Unstable,
    Failure,
    Aborted,
}

/// One commit of a build change set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub message: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl BuildInfo {
    /// Creates a successful build with no changes and no upstream
    pub fn new(job_name: impl Into<String>, number: u64) -> Self {
        Self {
            job_name: job_name.into(),
            number,
            full_display_name: None,
            workspace: None,
            result: BuildResult::Success,
            change_set: Vec::new(),
            upstream: None,
            env: BTreeMap::new(),
        }
    }

    pub fn with_change(mut self, message: impl Into<String>, author: impl Into<String>) -> Self {
        self.change_set.push(ChangeEntry {
            message: message.into(),
            author: Some(author.into()),
        });
        self
    }

    pub fn with_upstream(mut self, upstream: BuildInfo) -> Self {
        self.upstream = Some(Box::new(upstream));
        self
    }

    pub fn display_name(&self) -> String {
        self.full_display_name
            .clone()
            .unwrap_or_else(|| format!("{} #{}", self.job_name, self.number))
    }

    /// Values option placeholders may reference
    ///
    /// Starts from the build environment, then sets `JOB_NAME`,
    /// `BUILD_NUMBER`, `WORKSPACE` and, for triggered builds,
    /// `UPSTREAM_BUILD`.
    pub fn substitutions(&self) -> BTreeMap<String, String> {
        let mut values = self.env.clone();
        values.insert("JOB_NAME".to_string(), self.job_name.clone());
        values.insert("BUILD_NUMBER".to_string(), self.number.to_string());
        if let Some(workspace) = &self.workspace {
            values.insert("WORKSPACE".to_string(), workspace.clone());
        }
        if let Some(upstream) = &self.upstream {
            values.insert("UPSTREAM_BUILD".to_string(), upstream.display_name());
        }
        values
    }
}
