//! Execution command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use rundeck_client::RundeckApi;
use rundeck_core::domain::execution::{Execution, ExecutionStatus};

use crate::config::Config;

/// Execution subcommands
#[derive(Subcommand)]
pub enum ExecutionCommands {
    /// Get execution details
    Get {
        /// Execution id
        id: i64,
    },
}

/// Handle execution commands
pub async fn handle_execution_command(command: ExecutionCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        ExecutionCommands::Get { id } => {
            let execution = client.get_execution(id).await?;
            print_execution_details(&execution);
            Ok(())
        }
    }
}

/// Print detailed execution information
pub fn print_execution_details(execution: &Execution) {
    println!("{}", "Execution Details:".bold());
    println!("  ID:          {}", execution.id.to_string().cyan());
    println!("  Status:      {}", colorize_status(&execution.status));

    if let Some(job) = &execution.job {
        println!("  Job:         {}", job);
    }
    if let Some(url) = &execution.url {
        println!("  URL:         {}", url.dimmed());
    }
    if let Some(user) = &execution.started_by {
        println!("  Started by:  {}", user);
    }
    if let Some(user) = &execution.aborted_by {
        println!("  Aborted by:  {}", user.yellow());
    }
    if let Some(started) = execution.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(ended) = execution.ended_at {
        println!("  Ended:       {}", ended.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(duration) = execution.duration_words() {
        println!("  Duration:    {}", duration);
    }
    if let Some(description) = &execution.description {
        println!("  Description: {}", description.dimmed());
    }
}

/// Colorize execution status for display
pub fn colorize_status(status: &ExecutionStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        ExecutionStatus::Running => status_str.cyan(),
        ExecutionStatus::Succeeded => status_str.green(),
        ExecutionStatus::Failed => status_str.red(),
        ExecutionStatus::Aborted => status_str.yellow(),
        ExecutionStatus::Other(_) => status_str.dimmed(),
    }
}
