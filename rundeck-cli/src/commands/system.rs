//! Instance health commands

use anyhow::Result;
use colored::*;
use rundeck_client::{RundeckApi, RundeckClient};
use rundeck_notifier::service::{check_instance, check_job};
use std::collections::BTreeMap;

use crate::commands::notify::collect_options;
use crate::config::Config;

/// Checks that the server answers at all
pub async fn ping(config: &Config) -> Result<()> {
    let client = config.client()?;
    client.ping().await?;
    println!("{} {} is alive", "✓".green(), client.url().cyan());
    Ok(())
}

/// Checks that the server accepts the credentials
pub async fn check(config: &Config) -> Result<()> {
    let client = config.client()?;
    check_login(&client).await
}

/// Checks credentials, that the job exists and that its required options
/// are supplied
pub async fn check_job_options(
    config: &Config,
    job_id: &str,
    options_file: Option<&str>,
    option: &[(String, String)],
) -> Result<()> {
    let client = config.client()?;
    check_login(&client).await?;

    let job = check_job(&client, job_id).await?;
    println!("{} Job {}", "✓".green(), job.to_string().cyan());

    let context: BTreeMap<String, String> = std::env::vars().collect();
    let options = collect_options(options_file, option, &context)?;
    let missing = job.missing_options(&options);
    if missing.is_empty() {
        println!("{} All required options supplied", "✓".green());
    } else {
        println!(
            "{} Missing required options: {}",
            "⚠".yellow(),
            missing.join(", ").yellow()
        );
    }

    Ok(())
}

async fn check_login(client: &RundeckClient) -> Result<()> {
    if let Err(err) = check_instance(client).await {
        println!("{} {}", "✗".red(), format!("{} : {}", client.url(), err).red());
        return Err(err.into());
    }
    println!(
        "{} Logged in on {} as {}",
        "✓".green(),
        client.url().cyan(),
        client.login()
    );
    Ok(())
}
