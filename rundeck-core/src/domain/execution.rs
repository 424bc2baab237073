//! Execution domain types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::Job;

/// One run of a job on the Rundeck server
///
/// Executions are never updated in place: each status query yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: i64,
    pub status: ExecutionStatus,
    /// Link to follow the execution in the Rundeck UI
    pub url: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    /// Unset while the execution is still running
    pub ended_at: Option<DateTime<Utc>>,
    pub started_by: Option<String>,
    pub aborted_by: Option<String>,
    pub description: Option<String>,
    pub job: Option<Job>,
}

/// Execution status as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    Aborted,
    /// Any status the client does not know, kept as sent
    Other(String),
}

/// Statuses outside the core four that still mean the execution is over
const FINISHED_OTHER_STATUSES: &[&str] = &["timedout", "failed-with-retry"];

impl ExecutionStatus {
    /// Maps a status token to its variant
    ///
    /// Matching is case-sensitive against the lowercase wire tokens and the
    /// uppercase variant names; everything else becomes `Other`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "running" | "RUNNING" => Self::Running,
            "succeeded" | "SUCCEEDED" => Self::Succeeded,
            "failed" | "FAILED" => Self::Failed,
            "aborted" | "ABORTED" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether no further transition can happen from this status
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Succeeded | Self::Failed | Self::Aborted => true,
            Self::Running => false,
            Self::Other(raw) => FINISHED_OTHER_STATUSES.contains(&raw.as_str()),
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Running => write!(f, "RUNNING"),
            ExecutionStatus::Succeeded => write!(f, "SUCCEEDED"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
            ExecutionStatus::Aborted => write!(f, "ABORTED"),
            ExecutionStatus::Other(raw) => write!(f, "{}", raw.to_uppercase()),
        }
    }
}

impl Execution {
    /// Time between start and end, once both are known
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(started), Some(ended)) => Some(ended.signed_duration_since(started)),
            _ => None,
        }
    }

    /// Human readable duration, e.g. `3 minutes 27 seconds`
    pub fn duration_words(&self) -> Option<String> {
        self.duration().map(format_duration_words)
    }
}

/// Formats a duration in words, dropping leading and trailing zero units
///
/// `3m27s` gives `3 minutes 27 seconds`, `1h0m5s` gives
/// `1 hour 0 minutes 5 seconds` and zero gives `0 seconds`.
pub fn format_duration_words(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let units = [
        (total / 86_400, "day"),
        ((total % 86_400) / 3_600, "hour"),
        ((total % 3_600) / 60, "minute"),
        (total % 60, "second"),
    ];

    let first = units.iter().position(|(value, _)| *value != 0);
    let last = units.iter().rposition(|(value, _)| *value != 0);

    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => return "0 seconds".to_string(),
    };

    units[first..=last]
        .iter()
        .map(|(value, unit)| {
            if *value == 1 {
                format!("{} {}", value, unit)
            } else {
                format!("{} {}s", value, unit)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
