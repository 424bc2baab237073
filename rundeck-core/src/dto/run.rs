//! Job run request

use serde::{Deserialize, Serialize};

use crate::options::OptionSet;

/// Request to run a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJob {
    pub job_id: String,
    pub options: OptionSet,
    /// Node filter parameters, sent as-is (e.g. `tags=web`)
    pub node_filters: OptionSet,
}

impl RunJob {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    pub fn with_node_filters(mut self, node_filters: OptionSet) -> Self {
        self.node_filters = node_filters;
        self
    }

    /// The `argString` query value for this run
    pub fn arg_string(&self) -> String {
        self.options.to_arg_string()
    }
}
