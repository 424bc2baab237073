//! Job domain types

use serde::{Deserialize, Serialize};

use crate::options::OptionSet;

/// A job defined on the Rundeck server
///
/// Only ever built by the response parser; the identifier is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: Option<String>,
    pub group: Option<String>,
    pub project: Option<String>,
    pub description: Option<String>,
    pub options: Vec<JobOption>,
}

/// An option declared by a job definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOption {
    pub name: String,
    pub required: bool,
    pub default_value: Option<String>,
}

impl Job {
    /// Creates a job holding only its identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            group: None,
            project: None,
            description: None,
            options: Vec::new(),
        }
    }

    /// Full name of the job: `group/name`, or just `name` without a group
    pub fn full_name(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        match self.group.as_deref() {
            Some(group) if !group.is_empty() => format!("{}/{}", group, name),
            _ => name.to_string(),
        }
    }

    /// Options the job requires and gives no default for
    pub fn required_options(&self) -> impl Iterator<Item = &JobOption> {
        self.options
            .iter()
            .filter(|option| option.required && option.default_value.is_none())
    }

    /// Required options `options` does not supply
    pub fn missing_options(&self, options: &OptionSet) -> Vec<&str> {
        self.required_options()
            .map(|option| option.name.as_str())
            .filter(|name| options.get(name).is_none())
            .collect()
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}/{}",
            self.id,
            self.project.as_deref().unwrap_or_default(),
            self.full_name()
        )
    }
}
