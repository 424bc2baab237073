//! Execution tracker
//!
//! Triggers a job and optionally follows the resulting execution until it
//! reaches a terminal status:
//!
//! `NotTriggered -> Triggered -> Polling* -> Terminal`
//!
//! Polls are spaced by a fixed interval. There is no retry, no backoff and
//! no poll limit: the first failing call ends tracking and is returned to
//! the caller unchanged.

use rundeck_client::RundeckApi;
use rundeck_core::domain::execution::{Execution, ExecutionStatus};
use rundeck_core::dto::run::RunJob;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{NotifierError, Result};
use crate::scheduler::clock::Sleeper;

/// How an execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Succeeded,
    Failed,
    Aborted,
    /// Finished with a status outside the known ones
    Unknown,
}

impl Terminal {
    /// Terminal classification of an execution, `None` while it still runs
    pub fn of(execution: &Execution) -> Option<Self> {
        match &execution.status {
            ExecutionStatus::Succeeded => Some(Self::Succeeded),
            ExecutionStatus::Failed => Some(Self::Failed),
            ExecutionStatus::Aborted => Some(Self::Aborted),
            ExecutionStatus::Running => None,
            status @ ExecutionStatus::Other(_) => {
                (status.is_terminal() || execution.ended_at.is_some()).then_some(Self::Unknown)
            }
        }
    }

    /// Failed and aborted executions are failures; anything else is not
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed | Self::Aborted)
    }
}

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    NotTriggered,
    Triggered,
    Polling,
    Terminal(Terminal),
}

/// Final observation of a tracked execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOutcome {
    pub execution: Execution,
    pub terminal: Terminal,
    /// Status queries made after the trigger
    pub polls: u32,
}

impl TrackedOutcome {
    pub fn is_success(&self) -> bool {
        self.terminal.is_success()
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.execution.duration()
    }
}

/// Drives one execution from trigger to terminal status
pub struct ExecutionTracker<'a> {
    api: &'a dyn RundeckApi,
    sleeper: &'a dyn Sleeper,
    poll_interval: Duration,
    state: TrackerState,
    execution: Option<Execution>,
    polls: u32,
}

impl<'a> ExecutionTracker<'a> {
    /// Creates a tracker in the `NotTriggered` state
    pub fn new(api: &'a dyn RundeckApi, sleeper: &'a dyn Sleeper, poll_interval: Duration) -> Self {
        Self {
            api,
            sleeper,
            poll_interval,
            state: TrackerState::NotTriggered,
            execution: None,
            polls: 0,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Latest known execution
    pub fn execution(&self) -> Option<&Execution> {
        self.execution.as_ref()
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Runs the job
    ///
    /// On error the tracker stays `NotTriggered`. Calling this again once
    /// triggered does not start another execution.
    pub async fn trigger(&mut self, run: &RunJob) -> Result<&Execution> {
        if self.state != TrackerState::NotTriggered {
            warn!("Job {} already triggered, not running it again", run.job_id);
            return self.current();
        }

        let execution = self.api.trigger_job(run).await?;
        info!(
            "Triggered job {}: execution #{} ({})",
            run.job_id, execution.id, execution.status
        );

        self.state = TrackerState::Triggered;
        Ok(&*self.execution.insert(execution))
    }

    /// Fetches the execution once and updates the state
    pub async fn poll_once(&mut self) -> Result<&Execution> {
        let id = match &self.execution {
            Some(execution) => execution.id,
            None => return Err(NotifierError::NotTriggered),
        };

        self.state = TrackerState::Polling;
        let execution = self.api.get_execution(id).await?;
        self.polls += 1;
        debug!(
            "Poll #{} of execution #{}: {}",
            self.polls, id, execution.status
        );

        if let Some(terminal) = Terminal::of(&execution) {
            info!("Execution #{} finished with status {}", id, execution.status);
            self.state = TrackerState::Terminal(terminal);
        }

        Ok(&*self.execution.insert(execution))
    }

    /// Polls until the execution reaches a terminal status
    pub async fn wait_for_completion(&mut self) -> Result<TrackedOutcome> {
        let Some(execution) = &self.execution else {
            return Err(NotifierError::NotTriggered);
        };

        if let (TrackerState::Triggered, Some(terminal)) = (self.state, Terminal::of(execution)) {
            self.state = TrackerState::Terminal(terminal);
        }

        loop {
            if let TrackerState::Terminal(terminal) = self.state {
                let execution = self.current()?.clone();
                return Ok(TrackedOutcome {
                    execution,
                    terminal,
                    polls: self.polls,
                });
            }

            self.sleeper.sleep(self.poll_interval).await;
            self.poll_once().await?;
        }
    }

    fn current(&self) -> Result<&Execution> {
        self.execution.as_ref().ok_or(NotifierError::NotTriggered)
    }
}
