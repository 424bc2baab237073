//! Rundeck HTTP Client
//!
//! A small, typed client for the Rundeck API: run a job, follow its
//! execution, read a job definition and check connectivity.
//!
//! Rundeck answers in XML; responses are parsed into
//! [`rundeck_core`] domain types by the [`parser`] module.
//!
//! # Example
//!
//! ```no_run
//! use rundeck_client::{Credentials, RundeckApi, RundeckClient};
//! use rundeck_core::dto::run::RunJob;
//!
//! #[tokio::main]
//! async fn main() -> rundeck_client::Result<()> {
//!     let client = RundeckClient::new(
//!         "http://localhost:4440",
//!         Credentials::new("admin", "admin"),
//!     );
//!
//!     let execution = client.trigger_job(&RunJob::new("1")).await?;
//!     println!("Started execution #{}", execution.id);
//!     Ok(())
//! }
//! ```

mod api;
pub mod error;
mod executions;
mod jobs;
pub mod parser;
mod system;
pub mod xml;

// Re-export commonly used types
pub use api::RundeckApi;
pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Version of the Rundeck API the client speaks
pub const API_VERSION: u32 = 1;

/// Basic authentication credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// HTTP client for the Rundeck API
#[derive(Debug, Clone)]
pub struct RundeckClient {
    /// Base URL of the Rundeck server (e.g., "http://localhost:4440")
    base_url: String,
    /// Credentials sent with every request
    credentials: Credentials,
    /// HTTP client instance
    client: Client,
}

impl RundeckClient {
    /// Create a new Rundeck client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Rundeck server (e.g., "http://localhost:4440")
    /// * `credentials` - Login and password used for basic authentication
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_client(base_url, credentials, Client::new())
    }

    /// Create a new Rundeck client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, credentials: Credentials, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client,
        }
    }

    /// Get the base URL of the Rundeck server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Login used to authenticate
    pub fn login(&self) -> &str {
        &self.credentials.login
    }

    /// Parsed base URL
    fn root_url(&self) -> Result<Url> {
        Url::parse(&format!("{}/", self.base_url))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    /// URL of an API endpoint, e.g. `api_url(&["execution", "1"])`
    ///
    /// Each segment is percent-encoded, so ids cannot change the path.
    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.root_url()?;
        let version = API_VERSION.to_string();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{}: not a base URL", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .push(&version)
            .extend(segments);
        Ok(url)
    }

    /// Starts an authenticated GET request
    fn get(&self, url: Url) -> RequestBuilder {
        debug!("GET {}", url);
        self.client
            .get(url)
            .basic_auth(&self.credentials.login, Some(&self.credentials.password))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Read the body of an API response
    ///
    /// Error statuses that still carry a Rundeck error document become API
    /// errors; any other error status is a transport failure.
    async fn handle_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(root) = xml::parse_document(&body) {
                parser::check_api_error(&root)?;
            }
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body
            };
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
