//! Execution-related API endpoints

use rundeck_core::domain::execution::Execution;

use crate::RundeckClient;
use crate::error::Result;
use crate::parser;

impl RundeckClient {
    /// Get the current state of an execution
    ///
    /// Every call fetches and parses a fresh copy.
    pub async fn fetch_execution(&self, execution_id: i64) -> Result<Execution> {
        let url = self.api_url(&["execution", &execution_id.to_string()])?;
        let response = self.get(url).send().await?;
        let body = self.handle_response(response).await?;

        parser::parse_execution(&body)
    }
}
