//! Rundeck CLI
//!
//! Command-line interface for triggering and inspecting Rundeck jobs, and
//! for running the build notifier outside of a CI server.

mod commands;
mod config;
mod console;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use rundeck_notifier::config::DEFAULT_INSTANCE;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rundeck")]
#[command(about = "Rundeck job notifier CLI", long_about = None)]
struct Cli {
    /// Rundeck URL, registered under the selected instance name
    #[arg(long, env = "RUNDECK_URL")]
    url: Option<String>,

    /// Rundeck login
    #[arg(long, env = "RUNDECK_LOGIN", default_value = "")]
    login: String,

    /// Rundeck password
    #[arg(long, env = "RUNDECK_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// JSON file of named instances: {"name": {"url", "login", "password"}}
    #[arg(long, env = "RUNDECK_INSTANCES")]
    instances: Option<String>,

    /// Instance to use
    #[arg(long, default_value = DEFAULT_INSTANCE)]
    instance: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rundeck_notifier=info,rundeck_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(
        cli.instances.as_deref(),
        cli.url,
        cli.login,
        cli.password,
        cli.instance,
    )?;

    handle_command(cli.command, &config).await
}
