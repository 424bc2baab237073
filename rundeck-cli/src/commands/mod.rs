//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod execution;
mod job;
mod notify;
mod system;

pub use execution::ExecutionCommands;
pub use job::JobCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;
use notify::parse_key_val;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check that the Rundeck server answers
    Ping,
    /// Check the credentials, and optionally a job id
    Check {
        /// Job id to look up
        #[arg(long)]
        job: Option<String>,

        /// File of options to check against the job's required options
        #[arg(long, requires = "job")]
        options_file: Option<String>,

        /// Option as key=value, checked against the job's required options
        #[arg(short, long, requires = "job", value_parser = parse_key_val)]
        option: Vec<(String, String)>,
    },
    /// Job definitions
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Executions
    Execution {
        #[command(subcommand)]
        command: ExecutionCommands,
    },
    /// Run a job
    Trigger {
        /// Job id
        job_id: String,

        /// File of options, one key=value per line
        #[arg(long)]
        options_file: Option<String>,

        /// Option as key=value, overriding the file; `$NAME` expands from the environment
        #[arg(short, long, value_parser = parse_key_val)]
        option: Vec<(String, String)>,

        /// Node filter as key=value (e.g. tags=web)
        #[arg(short, long, value_parser = parse_key_val)]
        filter: Vec<(String, String)>,

        /// Wait for the execution to finish
        #[arg(short, long)]
        wait: bool,
    },
    /// Run the build notifier for a finished build
    Notify {
        /// JSON file describing the build
        #[arg(long)]
        build: String,

        /// JSON file with the trigger settings
        #[arg(long)]
        settings: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Ping => system::ping(config).await,
        Commands::Check {
            job,
            options_file,
            option,
        } => match job {
            Some(job) => system::check_job_options(config, &job, options_file.as_deref(), &option).await,
            None => system::check(config).await,
        },
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Execution { command } => {
            execution::handle_execution_command(command, config).await
        }
        Commands::Trigger {
            job_id,
            options_file,
            option,
            filter,
            wait,
        } => notify::trigger(config, job_id, options_file.as_deref(), &option, &filter, wait).await,
        Commands::Notify { build, settings } => notify::notify(config, &build, &settings).await,
    }
}
