//! Response parser against recorded Rundeck payloads

use chrono::{Duration, TimeZone, Utc};
use rundeck_client::parser::{parse_execution, parse_job};
use rundeck_core::domain::execution::ExecutionStatus;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {}", path, e))
}

#[test]
fn running_execution_from_trigger_response() {
    let execution = parse_execution(&fixture("job-run-success.xml")).unwrap();

    assert_eq!(execution.id, 1);
    assert_eq!(execution.status, ExecutionStatus::Running);
    assert_eq!(
        execution.url.as_deref(),
        Some("http://localhost:4440/execution/follow/1")
    );
    assert_eq!(
        execution.started_at,
        Some(Utc.timestamp_millis_opt(1302183830082).unwrap())
    );
    assert!(execution.ended_at.is_none());
    assert!(execution.duration().is_none());
}

#[test]
fn required_option_error_keeps_trailing_space() {
    let err = parse_execution(&fixture("job-run-failure.xml")).unwrap_err();

    assert!(err.is_api());
    assert_eq!(err.to_string(), "Option 'dir' is required. ");
}

#[test]
fn job_definition_export() {
    let job = parse_job(&fixture("job-definition.xml")).unwrap();

    assert_eq!(job.id, "1");
    assert_eq!(job.name.as_deref(), Some("job-name"));
    assert_eq!(job.group.as_deref(), Some("group-name"));
    assert_eq!(job.project.as_deref(), Some("project-name"));
    assert_eq!(job.description.as_deref(), Some("job description"));
    assert_eq!(job.required_options().count(), 0);
}

#[test]
fn unknown_job_is_an_api_error() {
    let err = parse_job(&fixture("job-definition-unknown.xml")).unwrap_err();
    assert_eq!(err.to_string(), "Job ID does not exist: 42");
}

#[test]
fn succeeded_execution_has_duration() {
    let execution = parse_execution(&fixture("execution-succeeded.xml")).unwrap();

    assert_eq!(execution.status, ExecutionStatus::Succeeded);
    assert_eq!(
        execution.duration(),
        Some(Duration::minutes(3) + Duration::seconds(27))
    );
    assert_eq!(
        execution.duration_words().as_deref(),
        Some("3 minutes 27 seconds")
    );
    assert!(execution.job.is_none());
}

#[test]
fn aborted_execution_with_text_dates() {
    let execution = parse_execution(&fixture("execution-aborted.xml")).unwrap();

    assert_eq!(execution.id, 7);
    assert_eq!(execution.status, ExecutionStatus::Aborted);
    assert_eq!(execution.aborted_by.as_deref(), Some("ops"));
    assert_eq!(execution.duration(), Some(Duration::seconds(26)));
}

#[test]
fn execution_without_id_is_malformed() {
    let err = parse_execution(&fixture("execution-missing-id.xml")).unwrap_err();

    assert!(err.is_malformed());
    assert!(err.to_string().contains("missing its id"));
}
