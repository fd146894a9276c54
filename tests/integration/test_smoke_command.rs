use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use nocmatch::services::smoke::{
    SmokeClient, SmokeClientConfig, SmokeStep, SmokeTest, StepOutcome,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct RecordedRequest {
    method: String,
    path: String,
    body: String,
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    fail_lookup: bool,
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    match uri.path() {
        "/health" => (
            StatusCode::OK,
            [("content-type", "application/json")],
            r#"{"status":"ok"}"#,
        )
            .into_response(),
        "/lookup-by-title" if state.fail_lookup => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        "/lookup-by-title" => Json(json!({
            "results": [{"noc_code": "12103", "title": "Conference and event planners", "score": 1.0}]
        }))
        .into_response(),
        "/match-noc" => Json(json!({
            "results": [{"noc_code": "12103", "title": "Conference and event planners", "score": 0.82}]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_stub(state: StubState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(record).with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn smoke_test(base_url: &str) -> SmokeTest {
    SmokeTest::new(SmokeClient::new(SmokeClientConfig::new(base_url)).unwrap())
}

#[tokio::test]
async fn test_smoke_issues_three_requests_in_order() {
    let state = StubState::default();
    let base_url = spawn_stub(state.clone()).await;

    let mut out = Vec::new();
    let report = smoke_test(&base_url).run(&mut out).await.unwrap();

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/health");
    assert_eq!(requests[0].body, "");

    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].path, "/lookup-by-title");
    assert_eq!(
        requests[1].body,
        r#"{"title":"Conference and event planners","k":3}"#
    );

    assert_eq!(requests[2].method, "POST");
    assert_eq!(requests[2].path, "/match-noc");
    assert_eq!(
        requests[2].body,
        r#"{"query":"plan and coordinate events, manage vendors, prepare budgets","k":3}"#
    );

    let steps: Vec<SmokeStep> = report.steps.iter().map(|s| s.step).collect();
    assert_eq!(steps, SmokeStep::ALL.to_vec());
    assert_eq!(report.responded(), 3);
}

#[tokio::test]
async fn test_smoke_prints_headers_and_parsed_json() {
    let base_url = spawn_stub(StubState::default()).await;

    let mut out = Vec::new();
    smoke_test(&base_url).run(&mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains(&format!("==> GET {base_url}/health")));
    assert!(output.contains("HTTP/1.1 200 OK"));
    assert!(output.contains("content-type: application/json"));
    assert!(output.contains(r#"{"status":"ok"}"#));

    assert!(output.contains(&format!("==> POST {base_url}/lookup-by-title")));
    assert!(output.contains(&format!("==> POST {base_url}/match-noc")));
    // Pretty-printed, one key per line
    assert!(output.contains("\"noc_code\": \"12103\""));
    assert!(output.contains("\"score\": 0.82"));

    let health = output.find("/health").unwrap();
    let lookup = output.find("/lookup-by-title").unwrap();
    let matching = output.find("/match-noc").unwrap();
    assert!(health < lookup && lookup < matching);
}

#[tokio::test]
async fn test_error_status_does_not_stop_the_run() {
    let state = StubState {
        fail_lookup: true,
        ..Default::default()
    };
    let base_url = spawn_stub(state.clone()).await;

    let mut out = Vec::new();
    let report = smoke_test(&base_url).run(&mut out).await.unwrap();

    assert_eq!(state.requests.lock().unwrap().len(), 3);
    assert_eq!(
        report.steps[1].outcome,
        StepOutcome::Responded { status: 500 }
    );
    assert_eq!(
        report.steps[2].outcome,
        StepOutcome::Responded { status: 200 }
    );

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Internal Server Error"));
}

#[tokio::test]
async fn test_unreachable_service_still_runs_every_step() {
    // Grab a free port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut out = Vec::new();
    let report = smoke_test(&format!("http://{addr}"))
        .run(&mut out)
        .await
        .unwrap();

    assert_eq!(report.steps.len(), 3);
    assert_eq!(report.responded(), 0);
    assert!(report
        .steps
        .iter()
        .all(|s| matches!(s.outcome, StepOutcome::TransportError { .. })));

    let output = String::from_utf8(out).unwrap();
    assert_eq!(output.matches("request failed").count(), 3);
}

#[tokio::test]
async fn test_custom_bodies_are_sent() {
    let state = StubState::default();
    let base_url = spawn_stub(state.clone()).await;

    let smoke = smoke_test(&base_url)
        .with_lookup(nocmatch::services::smoke::LookupByTitleRequest {
            title: "Welders".to_string(),
            k: 1,
        })
        .with_match(nocmatch::services::smoke::MatchNocRequest {
            query: "weld metal parts".to_string(),
            k: 2,
        });

    let mut out = Vec::new();
    smoke.run(&mut out).await.unwrap();

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests[1].body, r#"{"title":"Welders","k":1}"#);
    assert_eq!(requests[2].body, r#"{"query":"weld metal parts","k":2}"#);
}
