//! Scheduler module
//!
//! Follows a triggered Rundeck execution until it finishes.

pub mod clock;
pub mod tracker;

pub use clock::{Clock, Sleeper, SystemClock, TokioSleeper};
pub use tracker::{ExecutionTracker, Terminal, TrackedOutcome, TrackerState};
