//! Response parsing
//!
//! Turns Rundeck XML payloads into domain values. API responses are wrapped
//! in a `<result>` envelope which either carries the payload or an `<error>`
//! with a message; job definitions come as a bare `<joblist>` export.

use chrono::{DateTime, TimeZone, Utc};
use rundeck_core::domain::execution::{Execution, ExecutionStatus};
use rundeck_core::domain::job::{Job, JobOption};
use tracing::warn;

use crate::error::{ClientError, Result};
use crate::xml::{self, Element};

/// Parses a job, either embedded in an API result or from a job export
pub fn parse_job(payload: &str) -> Result<Job> {
    let root = xml::parse_document(payload)?;
    check_api_error(&root)?;

    let job = root
        .find("job")
        .ok_or_else(|| ClientError::malformed("response has no job element"))?;
    job_from_element(job)
}

/// Parses the execution of a run or status response
pub fn parse_execution(payload: &str) -> Result<Execution> {
    let root = xml::parse_document(payload)?;
    check_api_error(&root)?;

    let execution = root
        .find("execution")
        .ok_or_else(|| ClientError::malformed("response has no execution element"))?;
    execution_from_element(execution)
}

/// Checks a response that only reports success or failure
pub fn parse_result(payload: &str) -> Result<()> {
    let root = xml::parse_document(payload)?;
    check_api_error(&root)
}

/// Fails with the server message when the document reports an error
pub fn check_api_error(root: &Element) -> Result<()> {
    let flagged = matches!(root.attr("error"), Some("true"));
    let error = match root.name.as_str() {
        "error" | "failure" => Some(root),
        _ => root.child("error").or_else(|| root.child("failure")),
    };

    if !flagged && error.is_none() {
        return Ok(());
    }

    let message = error
        .and_then(|error| error.child_text("message").or_else(|| Some(error.text())))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| "Unknown API error".to_string());

    Err(ClientError::api(message))
}

fn execution_from_element(element: &Element) -> Result<Execution> {
    let id = required(element, "id", "execution")?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| ClientError::malformed(format!("execution id is not a number: {}", id)))?;

    let status = required(element, "status", "execution")?;

    let job = element.child("job").map(job_from_element).transpose()?;

    Ok(Execution {
        id,
        status: ExecutionStatus::from_token(&status),
        url: element
            .attr("href")
            .map(str::to_string)
            .or_else(|| element.child_text("url")),
        started_at: timestamp(element.child("date-started")),
        ended_at: timestamp(element.child("date-ended")),
        started_by: element.child_text("user"),
        aborted_by: element.child_text("abortedby"),
        description: element.child_text("description"),
        job,
    })
}

fn job_from_element(element: &Element) -> Result<Job> {
    let id = required(element, "id", "job")?;

    let project = element
        .child_text("project")
        .or_else(|| element.path(&["context", "project"]).map(Element::text))
        .filter(|project| !project.is_empty());

    let options = element
        .path(&["context", "options"])
        .or_else(|| element.child("options"))
        .map(|options| {
            options
                .elements()
                .filter(|option| option.name == "option")
                .filter_map(option_from_element)
                .collect()
        })
        .unwrap_or_default();

    Ok(Job {
        id,
        name: element.child_text("name"),
        group: element.child_text("group"),
        project,
        description: element.child_text("description"),
        options,
    })
}

fn option_from_element(element: &Element) -> Option<JobOption> {
    let name = element.attr("name").filter(|name| !name.is_empty())?;
    Some(JobOption {
        name: name.to_string(),
        required: element.attr("required") == Some("true"),
        default_value: element.attr("value").map(str::to_string),
    })
}

/// A required field, read from an attribute or a child element
fn required(element: &Element, field: &str, what: &str) -> Result<String> {
    element
        .attr(field)
        .map(str::to_string)
        .or_else(|| element.child_text(field))
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ClientError::malformed(format!("{} is missing its {}", what, field)))
}

/// Reads a date element: the `unixtime` attribute (milliseconds) or an
/// RFC 3339 text body
fn timestamp(element: Option<&Element>) -> Option<DateTime<Utc>> {
    let element = element?;

    if let Some(millis) = element.attr("unixtime") {
        match millis.trim().parse::<i64>() {
            Ok(millis) => return Utc.timestamp_millis_opt(millis).single(),
            Err(_) => warn!("Ignoring invalid unixtime on <{}>: {}", element.name, millis),
        }
    }

    let text = element.text();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match DateTime::parse_from_rfc3339(text) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            warn!("Ignoring invalid date on <{}>: {} ({})", element.name, text, e);
            None
        }
    }
}
