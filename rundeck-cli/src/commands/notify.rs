//! Trigger and notify commands

use anyhow::{Context, Result, bail};
use colored::*;
use rundeck_core::domain::build::BuildInfo;
use rundeck_core::dto::run::RunJob;
use rundeck_core::options::{OptionSet, parse_options, substitute};
use rundeck_notifier::scheduler::{ExecutionTracker, TokioSleeper};
use rundeck_notifier::{NotificationOutcome, Notifier, TriggerSettings};
use std::collections::BTreeMap;

use crate::commands::execution::colorize_status;
use crate::config::Config;
use crate::console::ConsoleBuildLog;

/// Parse a single key=value pair
pub fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Builds an option set from a file and `key=value` arguments
///
/// Arguments win over the file. `$NAME` placeholders expand from `context`.
pub fn collect_options(
    file: Option<&str>,
    pairs: &[(String, String)],
    context: &BTreeMap<String, String>,
) -> Result<OptionSet> {
    let raw = match file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file: {}", path))?,
        ),
        None => None,
    };

    let mut options: OptionSet = pairs
        .iter()
        .map(|(name, value)| (name.trim().to_string(), substitute(value, context)))
        .collect();
    options.merge_defaults(&parse_options(raw.as_deref(), context));
    Ok(options)
}

/// Runs a job, optionally waiting for it to finish
pub async fn trigger(
    config: &Config,
    job_id: String,
    options_file: Option<&str>,
    option: &[(String, String)],
    filter: &[(String, String)],
    wait: bool,
) -> Result<()> {
    let client = config.client()?;
    let context: BTreeMap<String, String> = std::env::vars().collect();

    let run = RunJob::new(job_id)
        .with_options(collect_options(options_file, option, &context)?)
        .with_node_filters(collect_options(None, filter, &context)?);

    let sleeper = TokioSleeper;
    let mut tracker = ExecutionTracker::new(&client, &sleeper, config.notifier.poll_interval);

    let execution = tracker.trigger(&run).await?;
    println!(
        "{} Execution #{} ({})",
        "✓".green(),
        execution.id.to_string().cyan(),
        colorize_status(&execution.status)
    );
    if let Some(url) = &execution.url {
        println!("  {}", url.dimmed());
    }

    if !wait {
        return Ok(());
    }

    println!("{}", "Waiting for Rundeck execution to finish...".dimmed());
    let outcome = tracker.wait_for_completion().await?;
    println!(
        "Execution #{} finished in {}, with status : {}",
        outcome.execution.id,
        outcome
            .execution
            .duration_words()
            .unwrap_or_else(|| "an unknown time".to_string()),
        colorize_status(&outcome.execution.status)
    );

    if !outcome.is_success() {
        bail!("Execution #{} did not succeed", outcome.execution.id);
    }
    Ok(())
}

/// Runs the build notifier as a CI post-build step would
pub async fn notify(config: &Config, build_path: &str, settings_path: &str) -> Result<()> {
    let build: BuildInfo = read_json(build_path)?;
    let settings: TriggerSettings = read_json(settings_path)?;

    let notifier = Notifier::from_registry(settings, &config.registry, &config.notifier)?;
    let report = notifier.perform(&build, &ConsoleBuildLog).await;

    if let NotificationOutcome::Skipped(reason) = &report.outcome {
        println!("{}", format!("Not notifying Rundeck: {:?}", reason).dimmed());
    }

    if report.fail_build {
        bail!("Rundeck notification failed the build");
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid JSON in {}", path))
}
