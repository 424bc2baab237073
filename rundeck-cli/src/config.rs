//! Configuration module
//!
//! Builds the instance registry from the command line, an optional
//! instances file and the environment.

use anyhow::{Context, Result};
use rundeck_client::RundeckClient;
use rundeck_notifier::{Instance, InstanceRegistry, NotifierConfig};
use tracing::debug;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: InstanceRegistry,
    /// Instance selected with `--instance`
    pub instance: String,
    pub notifier: NotifierConfig,
}

impl Config {
    /// Loads configuration
    ///
    /// Instances come from `instances_file` when given. A `url` registers
    /// (or replaces) the selected instance with the given credentials.
    pub fn load(
        instances_file: Option<&str>,
        url: Option<String>,
        login: String,
        password: String,
        instance: String,
    ) -> Result<Self> {
        let mut registry = match instances_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read instances file: {}", path))?;
                InstanceRegistry::from_json(&json)
                    .with_context(|| format!("Invalid instances file: {}", path))?
            }
            None => InstanceRegistry::new(),
        };

        if let Some(url) = url {
            registry = registry.with_instance(instance.clone(), Instance::new(url, login, password));
        }

        registry.validate()?;
        debug!("Loaded {} instance(s): {:?}", registry.len(), registry.names());

        Ok(Self {
            registry,
            instance,
            notifier: NotifierConfig::from_env(),
        })
    }

    /// Client for the selected instance
    pub fn client(&self) -> Result<RundeckClient> {
        Ok(self.registry.client_for(&self.instance, None)?)
    }
}
