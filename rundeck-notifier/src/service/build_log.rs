//! Build log
//!
//! The notifier reports its progress as plain lines in the build console.
//! These lines are a stable contract: existing log scrapers match on them.

use std::sync::{Arc, Mutex};

/// Destination of the notifier's progress lines
pub trait BuildLog: Send + Sync {
    /// Appends one line to the build log
    fn println(&self, line: &str);
}

/// In-memory build log
///
/// Uses Arc<Mutex<Vec<String>>> so clones share the same lines.
#[derive(Clone, Default)]
pub struct InMemoryBuildLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl InMemoryBuildLog {
    /// Creates an empty build log
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Whether any line contains `text`
    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|line| line.contains(text))
    }
}

impl BuildLog for InMemoryBuildLog {
    fn println(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
