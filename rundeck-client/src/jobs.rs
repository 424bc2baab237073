//! Job-related API endpoints

use rundeck_core::domain::execution::Execution;
use rundeck_core::domain::job::Job;
use rundeck_core::dto::run::RunJob;
use tracing::info;

use crate::RundeckClient;
use crate::error::Result;
use crate::parser;

impl RundeckClient {
    // =============================================================================
    // Jobs
    // =============================================================================

    /// Run a job
    ///
    /// Options travel as a single `argString`; node filters are sent as
    /// individual query parameters.
    ///
    /// # Returns
    /// The execution started by the server
    pub async fn run_job(&self, run: &RunJob) -> Result<Execution> {
        let url = self.api_url(&["job", &run.job_id, "run"])?;
        let query = run_query(run);

        info!("Running job {} on {}", run.job_id, self.base_url);
        let response = self.get(url).query(&query).send().await?;
        let body = self.handle_response(response).await?;

        parser::parse_execution(&body)
    }

    /// Get a job definition by ID
    pub async fn fetch_job(&self, job_id: &str) -> Result<Job> {
        let url = self.api_url(&["job", job_id])?;
        let response = self.get(url).send().await?;
        let body = self.handle_response(response).await?;

        parser::parse_job(&body)
    }
}

/// Query parameters of a run request
fn run_query(run: &RunJob) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if !run.options.is_empty() {
        query.push(("argString".to_string(), run.arg_string()));
    }
    query.extend(
        run.node_filters
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string())),
    );
    query
}
