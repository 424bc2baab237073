//! Connectivity checks

use crate::RundeckClient;
use crate::error::Result;
use crate::parser;

impl RundeckClient {
    /// Check that the server answers at all
    pub async fn check_alive(&self) -> Result<()> {
        let url = self.root_url()?;
        let response = self.get(url).send().await?;
        self.handle_response(response).await?;
        Ok(())
    }

    /// Check that the credentials are accepted by the API
    pub async fn check_credentials(&self) -> Result<()> {
        let url = self.api_url(&["system", "info"])?;
        let response = self.get(url).send().await?;
        let body = self.handle_response(response).await?;

        parser::parse_result(&body)
    }
}
