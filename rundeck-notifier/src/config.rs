//! Notifier configuration
//!
//! Three pieces of configuration feed the notifier:
//! - the registry of Rundeck instances (URL and default credentials per name)
//! - per-trigger settings (which job, which options, when to notify)
//! - process-wide tuning (poll interval, job cache)

use rundeck_client::{Credentials, RundeckClient};
use rundeck_core::tags::parse_tags;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{NotifierError, Result};

/// Name of the instance used when a trigger does not name one
pub const DEFAULT_INSTANCE: &str = "Default";

/// A Rundeck server the notifier can talk to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Base URL (e.g., "http://localhost:4440")
    pub url: String,
    pub login: String,
    pub password: String,
}

impl Instance {
    pub fn new(
        url: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.login, &self.password)
    }

    /// Validates the instance
    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(NotifierError::InvalidConfig(format!(
                "url must start with http:// or https:// (got '{}')",
                self.url
            )));
        }

        if self.login.is_empty() {
            return Err(NotifierError::InvalidConfig(
                "login cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Registered Rundeck instances, by name
///
/// Built once at startup, then only read; share it behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceRegistry {
    instances: HashMap<String, Instance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance, replacing any previous one with the same name
    pub fn with_instance(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.instances.insert(name.into(), instance);
        self
    }

    /// Loads a registry from JSON: `{ "<name>": { "url", "login", "password" } }`
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Builds a single `Default` instance from environment variables
    ///
    /// Expected environment variables:
    /// - RUNDECK_URL (required)
    /// - RUNDECK_LOGIN (required)
    /// - RUNDECK_PASSWORD (optional, default: empty)
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("RUNDECK_URL")
            .map_err(|_| anyhow::anyhow!("RUNDECK_URL environment variable not set"))?;

        let login = std::env::var("RUNDECK_LOGIN")
            .map_err(|_| anyhow::anyhow!("RUNDECK_LOGIN environment variable not set"))?;

        let password = std::env::var("RUNDECK_PASSWORD").unwrap_or_default();

        let registry = Self::new().with_instance(DEFAULT_INSTANCE, Instance::new(url, login, password));
        registry.validate()?;
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.instances.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a client for the named instance
    ///
    /// `credentials` replaces the instance defaults when given.
    pub fn client_for(&self, name: &str, credentials: Option<Credentials>) -> Result<RundeckClient> {
        let instance = self
            .get(name)
            .ok_or_else(|| NotifierError::UnknownInstance(name.to_string()))?;

        Ok(RundeckClient::new(
            instance.url.clone(),
            credentials.unwrap_or_else(|| instance.credentials()),
        ))
    }

    /// Validates every instance
    pub fn validate(&self) -> Result<()> {
        for (name, instance) in &self.instances {
            instance.validate().map_err(|e| {
                NotifierError::InvalidConfig(format!("instance '{}': {}", name, e))
            })?;
        }
        Ok(())
    }
}

/// What to trigger for a build, and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// Registered instance to use
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Identifier of the Rundeck job
    pub job_id: String,

    /// Job options, one `key=value` per line
    #[serde(default)]
    pub options: Option<String>,

    /// Node filters, one `key=value` per line
    #[serde(default)]
    pub node_filters: Option<String>,

    /// Comma separated tags required in commit messages
    #[serde(default)]
    pub tags: Option<String>,

    /// Block until the execution finishes
    #[serde(default)]
    pub wait_for_job: bool,

    /// Fail the build when the notification does not succeed
    #[serde(default)]
    pub fail_build_on_error: bool,

    /// Login replacing the instance default
    #[serde(default)]
    pub job_user: Option<String>,

    #[serde(default)]
    pub job_password: Option<String>,
}

fn default_instance() -> String {
    DEFAULT_INSTANCE.to_string()
}

impl TriggerSettings {
    /// Creates settings for a job on the default instance
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            instance: default_instance(),
            job_id: job_id.into(),
            options: None,
            node_filters: None,
            tags: None,
            wait_for_job: false,
            fail_build_on_error: false,
            job_user: None,
            job_password: None,
        }
    }

    /// Parsed tag list; empty means every build qualifies
    pub fn tags(&self) -> Vec<String> {
        parse_tags(self.tags.as_deref())
    }

    /// Per-trigger credentials, when a job user is set
    pub fn credentials(&self) -> Option<Credentials> {
        self.job_user
            .as_deref()
            .filter(|user| !user.trim().is_empty())
            .map(|user| Credentials::new(user, self.job_password.clone().unwrap_or_default()))
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if self.job_id.trim().is_empty() {
            return Err(NotifierError::InvalidConfig(
                "job_id cannot be empty".to_string(),
            ));
        }

        if self.instance.trim().is_empty() {
            return Err(NotifierError::InvalidConfig(
                "instance cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Job details cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobCacheConfig {
    pub enabled: bool,
    /// How long a fetched job definition stays valid
    pub expiration: Duration,
}

impl Default for JobCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            expiration: Duration::from_secs(30 * 60),
        }
    }
}

/// Process-wide notifier configuration
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Delay between two execution status queries
    pub poll_interval: Duration,

    pub job_cache: JobCacheConfig,
}

impl NotifierConfig {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            job_cache: JobCacheConfig::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - RUNDECK_POLL_INTERVAL (optional, seconds, default: 5)
    /// - RUNDECK_JOB_CACHE_ENABLED (optional, default: false)
    /// - RUNDECK_JOB_CACHE_EXPIRATION_MINUTES (optional, default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::new();

        let poll_interval = std::env::var("RUNDECK_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let enabled = std::env::var("RUNDECK_JOB_CACHE_ENABLED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(defaults.job_cache.enabled);

        let expiration = std::env::var("RUNDECK_JOB_CACHE_EXPIRATION_MINUTES")
            .ok()
            .and_then(|s| parse_minutes(&s))
            .unwrap_or(defaults.job_cache.expiration);

        Self {
            poll_interval,
            job_cache: JobCacheConfig {
                enabled,
                expiration,
            },
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(NotifierError::InvalidConfig(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.job_cache.enabled && self.job_cache.expiration.is_zero() {
            return Err(NotifierError::InvalidConfig(
                "job cache expiration must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parses a number of minutes; `None` when invalid or too large
fn parse_minutes(value: &str) -> Option<Duration> {
    let minutes = value.trim().parse::<u64>().ok()?;
    minutes.checked_mul(60).map(Duration::from_secs)
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self::new()
    }
}
