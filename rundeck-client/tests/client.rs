//! Client against a canned local HTTP server

use std::sync::{Arc, Mutex};

use rundeck_client::{Credentials, RundeckApi, RundeckClient};
use rundeck_core::domain::execution::ExecutionStatus;
use rundeck_core::dto::run::RunJob;
use rundeck_core::options::OptionSet;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const RUN_SUCCESS: &str = include_str!("fixtures/job-run-success.xml");
const RUN_FAILURE: &str = include_str!("fixtures/job-run-failure.xml");
const JOB_DEFINITION: &str = include_str!("fixtures/job-definition.xml");
const EXECUTION_SUCCEEDED: &str = include_str!("fixtures/execution-succeeded.xml");

/// Serves one canned response per connection and records request heads
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            recorded
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (url, requests)
}

fn client(url: &str) -> RundeckClient {
    RundeckClient::new(url, Credentials::new("admin", "admin"))
}

#[tokio::test]
async fn trigger_sends_arg_string_and_basic_auth() {
    let (url, requests) = serve(vec![(200, RUN_SUCCESS)]).await;

    let mut options = OptionSet::new();
    options.insert("option1", "value 1");
    let execution = client(&url)
        .trigger_job(&RunJob::new("1").with_options(options))
        .await
        .unwrap();

    assert_eq!(execution.id, 1);
    assert_eq!(execution.status, ExecutionStatus::Running);

    let requests = requests.lock().unwrap();
    let head = &requests[0];
    assert!(head.starts_with("GET /api/1/job/1/run?argString="));
    assert!(head.contains("option1"));
    // base64 of admin:admin
    assert!(head.to_lowercase().contains("authorization: basic ywrtaw46ywrtaw4="));
}

#[tokio::test]
async fn trigger_reports_api_error() {
    let (url, _) = serve(vec![(200, RUN_FAILURE)]).await;

    let err = client(&url).trigger_job(&RunJob::new("1")).await.unwrap_err();

    assert!(err.is_api());
    assert_eq!(err.to_string(), "Option 'dir' is required. ");
}

#[tokio::test]
async fn error_status_with_api_document_is_api_error() {
    let (url, _) = serve(vec![(404, RUN_FAILURE)]).await;

    let err = client(&url).get_execution(1).await.unwrap_err();
    assert!(err.is_api());
}

#[tokio::test]
async fn error_status_without_document_is_transport_error() {
    let (url, _) = serve(vec![(401, "")]).await;

    let err = client(&url).test_credentials().await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn get_execution_and_job() {
    let (url, requests) = serve(vec![(200, EXECUTION_SUCCEEDED), (200, JOB_DEFINITION)]).await;
    let client = client(&url);

    let execution = client.get_execution(1).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Succeeded);

    let job = client.get_job("1").await.unwrap();
    assert_eq!(job.name.as_deref(), Some("job-name"));

    let requests = requests.lock().unwrap();
    assert!(requests[0].starts_with("GET /api/1/execution/1 "));
    assert!(requests[1].starts_with("GET /api/1/job/1 "));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).ping().await.unwrap_err();
    assert!(err.is_transport());
}
