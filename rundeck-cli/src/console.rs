//! Console build log
//!
//! Prints notifier progress lines to stdout, colored by what they report.

use colored::*;
use rundeck_notifier::BuildLog;

/// Build log writing to the terminal
pub struct ConsoleBuildLog;

impl BuildLog for ConsoleBuildLog {
    fn println(&self, line: &str) {
        let colored = if line.starts_with("Error") || line.starts_with("Login failed") {
            line.red()
        } else if line.starts_with("Notification succeeded") {
            line.green()
        } else if line.starts_with("Rundeck execution") {
            line.bold()
        } else {
            line.normal()
        };
        println!("{}", colored);
    }
}
