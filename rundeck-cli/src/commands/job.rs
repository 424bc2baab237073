//! Job command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use rundeck_client::RundeckApi;
use rundeck_core::domain::job::Job;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Get job details
    Get {
        /// Job id
        id: String,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        JobCommands::Get { id } => {
            let job = client.get_job(&id).await?;
            print_job_details(&job);
            Ok(())
        }
    }
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.cyan());
    println!("  Name:        {}", job.full_name());
    if let Some(project) = &job.project {
        println!("  Project:     {}", project);
    }
    if let Some(description) = job.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  Description: {}", description.dimmed());
    }

    if !job.options.is_empty() {
        println!("\n{}", "Options:".bold());
        for option in &job.options {
            let required = if option.required {
                " (required)".yellow()
            } else {
                "".normal()
            };
            match &option.default_value {
                Some(default) => println!("  {} = {}{}", option.name.cyan(), default, required),
                None => println!("  {}{}", option.name.cyan(), required),
            }
        }
    }
}
