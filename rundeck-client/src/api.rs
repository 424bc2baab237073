//! The operations the notifier needs from Rundeck
//!
//! Kept as a trait so the tracker and notifier can run against fakes.

use async_trait::async_trait;
use rundeck_core::domain::execution::Execution;
use rundeck_core::domain::job::Job;
use rundeck_core::dto::run::RunJob;

use crate::RundeckClient;
use crate::error::Result;

/// Remote Rundeck operations
#[async_trait]
pub trait RundeckApi: Send + Sync {
    /// Base URL of the server, for messages
    fn url(&self) -> &str;

    /// Runs a job and returns the started execution
    async fn trigger_job(&self, run: &RunJob) -> Result<Execution>;

    /// Fetches the current state of an execution
    async fn get_execution(&self, execution_id: i64) -> Result<Execution>;

    /// Fetches a job definition
    async fn get_job(&self, job_id: &str) -> Result<Job>;

    /// Checks that the server is reachable
    async fn ping(&self) -> Result<()>;

    /// Checks that the credentials are valid
    async fn test_credentials(&self) -> Result<()>;
}

#[async_trait]
impl RundeckApi for RundeckClient {
    fn url(&self) -> &str {
        self.base_url()
    }

    async fn trigger_job(&self, run: &RunJob) -> Result<Execution> {
        self.run_job(run).await
    }

    async fn get_execution(&self, execution_id: i64) -> Result<Execution> {
        self.fetch_execution(execution_id).await
    }

    async fn get_job(&self, job_id: &str) -> Result<Job> {
        self.fetch_job(job_id).await
    }

    async fn ping(&self) -> Result<()> {
        self.check_alive().await
    }

    async fn test_credentials(&self) -> Result<()> {
        self.check_credentials().await
    }
}
