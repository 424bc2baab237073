//! Service layer
//!
//! The notifier itself plus the pieces it is wired with: the build log it
//! reports to and the optional job definition cache.

pub mod build_log;
pub mod job_cache;
pub mod notifier;

pub use build_log::{BuildLog, InMemoryBuildLog};
pub use job_cache::CachedRundeckApi;
pub use notifier::{
    BuildBadge, NotificationOutcome, NotificationReport, Notifier, SkipReason, check_instance,
    check_job,
};
