#![allow(clippy::unwrap_used)]
// Integration tests for commit submission, job polling, and job listing.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scm_core::{
    CancellationToken, ClientConfig, CommitRequest, CoreError, Credentials, ErrorKind, JobParent,
    JobStatus, Scm, WaitOptions,
};

const TOKEN_PATH: &str = "/am/oauth2/access_token";
const PUSH: &str = "/config/operations/v1/config-versions/candidate:push";
const JOBS: &str = "/config/operations/v1/jobs";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Scm) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 899
        })))
        .mount(&server)
        .await;

    let config = ClientConfig::new(Credentials::new("svc", "secret", "1234567890"))
        .api_url(server.uri())
        .token_url(format!("{}{TOKEN_PATH}", server.uri()));
    (server, Scm::new(config).unwrap())
}

fn fast() -> WaitOptions {
    WaitOptions::default()
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
}

fn job_body(id: &str, status: &str, result: &str, percent: &str) -> serde_json::Value {
    json!({
        "data": [{
            "id": id,
            "status_str": status,
            "result_str": result,
            "percent": percent,
            "job_type": "53",
            "type_str": "CommitAndPush",
            "parent_id": "0"
        }]
    })
}

// ── Commit ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_commit_with_empty_description_sends_nothing() {
    let (server, scm) = setup().await;

    Mock::given(method("POST"))
        .and(path(PUSH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = CommitRequest::new(["Texas"], ["all"], "");
    let err = scm.operations.commit(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_commit_posts_request_and_returns_job_id() {
    let (server, scm) = setup().await;

    Mock::given(method("POST"))
        .and(path(PUSH))
        .and(body_json(json!({
            "folders": ["Texas", "Remote Networks"],
            "admin": ["admin@example.com"],
            "description": "quarterly push"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "1586",
            "message": "CommitAndPush job enqueued with jobid 1586"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CommitRequest::new(
        ["Texas", "Remote Networks"],
        ["admin@example.com"],
        "quarterly push",
    );
    let response = scm.operations.commit(&request).await.unwrap();
    assert!(response.success);
    assert_eq!(response.job_id, "1586");
}

#[tokio::test]
async fn test_commit_and_wait_polls_until_finished() {
    let (server, scm) = setup().await;

    Mock::given(method("POST"))
        .and(path(PUSH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "1586",
            "message": "enqueued"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/1586")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("1586", "ACT", "PEND", "40")),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/1586")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("1586", "FIN", "OK", "100")),
        )
        .mount(&server)
        .await;

    let request = CommitRequest::new(["Texas"], ["all"], "push");
    let outcome = scm
        .operations
        .commit_and_wait(&request, &fast())
        .await
        .unwrap();

    let job = outcome.job.unwrap();
    assert_eq!(job.status(), JobStatus::Finished);
    assert!(job.succeeded());
    assert_eq!(job.percent(), Some(100));
}

// ── Waiting ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_job_is_returned_not_raised() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/77")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("77", "FAIL", "FAIL", "100")),
        )
        .mount(&server)
        .await;

    let job = scm.operations.wait_for_job("77", &fast()).await.unwrap();
    assert!(job.is_terminal());
    assert!(!job.succeeded());
}

#[tokio::test]
async fn test_terminal_job_status_is_stable() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/12")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("12", "FIN", "OK", "100")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let first = scm.operations.get_job_status("12").await.unwrap();
    let second = scm.operations.get_job_status("12").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_wait_times_out_on_stuck_job() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/99")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("99", "ACT", "PEND", "10")),
        )
        .mount(&server)
        .await;

    let options = fast().timeout(Duration::from_millis(200));
    let err = scm.operations.wait_for_job("99", &options).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::JobTimeout { ref job_id, waited } if job_id == "99" && waited == Duration::from_millis(200)
    ));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("200ms"), "{err}");
}

#[tokio::test]
async fn test_wait_stops_on_terminal_job_status_field() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "7", "job_status": "FIN", "result_str": "OK" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = fast().timeout(Duration::from_millis(300));
    let job = scm.operations.wait_for_job("7", &options).await.unwrap();
    assert_eq!(job.status(), JobStatus::Finished);
    assert!(job.succeeded());
}

#[tokio::test]
async fn test_zero_poll_interval_is_rejected_before_polling() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/99")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("99", "ACT", "PEND", "10")),
        )
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(PUSH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let options = fast().interval(Duration::ZERO);
    let err = scm.operations.wait_for_job("99", &options).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let request = CommitRequest::new(["Texas"], ["all"], "push");
    let err = scm
        .operations
        .commit_and_wait(&request, &options)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_wait_can_be_cancelled() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/55")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job_body("55", "PEND", "PEND", "0")),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let options = fast().timeout(Duration::from_secs(30)).cancel(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });
    let err = scm.operations.wait_for_job("55", &options).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, CoreError::Cancelled { .. }));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_jobs_isolates_top_level_and_children() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(JOBS))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "10", "parent_id": "0", "status_str": "FIN" },
                { "id": "11", "parent_id": "10", "status_str": "FIN" },
                { "id": "12", "parent_id": "10", "status_str": "ACT" },
                { "id": "20", "status_str": "PEND" }
            ],
            "total": 4,
            "limit": 100,
            "offset": 0
        })))
        .mount(&server)
        .await;

    let page = scm.operations.list_jobs(100, 0, None).await.unwrap();
    assert_eq!(page.total, Some(4));
    assert_eq!(page.data.len(), 4);

    let top = scm
        .operations
        .list_jobs(100, 0, Some(&JobParent::TopLevel))
        .await
        .unwrap();
    let ids: Vec<&str> = top.data.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, ["10", "20"]);

    let children = scm
        .operations
        .list_jobs(100, 0, Some(&JobParent::ChildrenOf("10".into())))
        .await
        .unwrap();
    let ids: Vec<&str> = children.data.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, ["11", "12"]);
}

#[tokio::test]
async fn test_list_all_jobs_paginates() {
    let (server, scm) = setup().await;

    let jobs: Vec<serde_json::Value> = (0..250)
        .map(|i| json!({ "id": i.to_string(), "parent_id": "0", "status_str": "FIN" }))
        .collect();
    let (first, rest) = (jobs[..200].to_vec(), jobs[200..].to_vec());
    Mock::given(method("GET"))
        .and(path(JOBS))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": first, "total": 250, "limit": 200, "offset": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(JOBS))
        .and(query_param("offset", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": rest, "total": 250, "limit": 200, "offset": 200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let all = scm.operations.list_all_jobs(None).await.unwrap();
    assert_eq!(all.len(), 250);
}
