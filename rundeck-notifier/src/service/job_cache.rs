//! Job details cache
//!
//! Job definitions change rarely, so lookups made while validating
//! configuration can be served from memory for a while. Only `get_job` is
//! cached; everything else goes straight to the server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rundeck_client::{Result, RundeckApi};
use rundeck_core::domain::execution::Execution;
use rundeck_core::domain::job::Job;
use rundeck_core::dto::run::RunJob;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::config::JobCacheConfig;
use crate::scheduler::clock::{Clock, SystemClock};

/// `RundeckApi` decorator caching job definitions
pub struct CachedRundeckApi {
    inner: Arc<dyn RundeckApi>,
    config: JobCacheConfig,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, (DateTime<Utc>, Job)>>,
}

impl CachedRundeckApi {
    pub fn new(inner: Arc<dyn RundeckApi>, config: JobCacheConfig) -> Self {
        Self::with_clock(inner, config, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: Arc<dyn RundeckApi>, config: JobCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            config,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached job definitions
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops a job from the cache
    pub fn invalidate(&self, job_id: &str) {
        self.entries.lock().unwrap().remove(job_id);
    }

    /// Fresh cached definition; a stale one is dropped
    fn cached(&self, job_id: &str) -> Option<Job> {
        let mut entries = self.entries.lock().unwrap();
        let (fetched_at, job) = entries.get(job_id)?;
        let age = self.clock.now().signed_duration_since(*fetched_at);
        if age.to_std().map_or(true, |age| age < self.config.expiration) {
            return Some(job.clone());
        }

        debug!("Cached job {} expired", job_id);
        entries.remove(job_id);
        None
    }
}

#[async_trait]
impl RundeckApi for CachedRundeckApi {
    fn url(&self) -> &str {
        self.inner.url()
    }

    async fn trigger_job(&self, run: &RunJob) -> Result<Execution> {
        self.inner.trigger_job(run).await
    }

    async fn get_execution(&self, execution_id: i64) -> Result<Execution> {
        self.inner.get_execution(execution_id).await
    }

    async fn get_job(&self, job_id: &str) -> Result<Job> {
        if !self.config.enabled {
            return self.inner.get_job(job_id).await;
        }

        if let Some(job) = self.cached(job_id) {
            debug!("Job {} served from cache", job_id);
            return Ok(job);
        }

        let job = self.inner.get_job(job_id).await?;
        self.entries
            .lock()
            .unwrap()
            .insert(job_id.to_string(), (self.clock.now(), job.clone()));
        Ok(job)
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }

    async fn test_credentials(&self) -> Result<()> {
        self.inner.test_credentials().await
    }
}
