//! Rundeck Notifier
//!
//! Triggers a Rundeck job when a CI build finishes.
//!
//! Architecture:
//! - Configuration: registered instances, per-trigger settings, tuning
//! - Scheduler: follows a triggered execution until it ends
//! - Services: the per-build notification flow and its collaborators
//!
//! Talking to Rundeck goes through [`rundeck_client::RundeckApi`], so the
//! whole flow can run against an in-memory stand-in.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

pub use config::{Instance, InstanceRegistry, JobCacheConfig, NotifierConfig, TriggerSettings};
pub use error::{NotifierError, Result};
pub use service::{BuildLog, NotificationOutcome, NotificationReport, Notifier};
