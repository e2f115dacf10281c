//! End-to-end tests for the Duet web UI routes
//!
//! Drives the axum router directly:
//! - GET / and GET /transcript
//! - POST /chat (echo, empty input, trigger phrase)
//! - GET /demo and GET /demo/stream
//! - POST /upload/:kind

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use duet_adaptor_web::{ChatOutput, DuetUiConfig, DuetUiServer, TranscriptOutput};
use duet_core::{count_turn_blocks, SessionSettings, DEFAULT_TRIGGER_PHRASE};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

const FIXTURE: &str = r#"{
    "start": [{"role": "Agent A", "content": "opening"}, {"role": "Agent B", "content": "counter"}],
    "argue": [{"role": "Agent A", "content": "a1"}, {"role": "Agent B", "content": "b1"}, {"role": "Agent A", "content": "a2"}],
    "decision": [{"role": "Decider", "content": "verdict"}]
}"#;

// ============================================================================
// Test Setup
// ============================================================================

fn setup_with_fixture(fixture: Option<&str>) -> (DuetUiServer, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let fixture_path = dir.path().join("chat.json");
    if let Some(json) = fixture {
        std::fs::write(&fixture_path, json).unwrap();
    }
    let config = DuetUiConfig {
        uploads_dir: dir.path().join("uploads"),
        session: SessionSettings::default()
            .with_fixture_path(&fixture_path)
            .with_replay_interval(Duration::from_millis(5)),
        ..Default::default()
    };
    (DuetUiServer::new(config), dir)
}

fn setup() -> (DuetUiServer, TempDir) {
    setup_with_fixture(Some(FIXTURE))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn chat(router: &Router, text: &str) -> ChatOutput {
    let (status, body) = post_json(router, "/chat", serde_json::json!({ "text": text })).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).unwrap()
}

async fn turns(router: &Router) -> usize {
    let (_, body) = get(router, "/transcript").await;
    let output: TranscriptOutput = serde_json::from_str(&body).unwrap();
    output.turns
}

fn sse_events(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("event:"))
        .map(|name| name.trim().to_string())
        .collect()
}

fn b64(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine};
    STANDARD.encode(bytes)
}

fn files_in(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Page and Transcript Tests
// ============================================================================

#[tokio::test]
async fn test_index_shows_greeting() {
    let (server, _dir) = setup();
    let router = server.router();

    let (status, body) = get(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("class=\"duet-chat\""));
    assert!(body.contains("System initialized; both agents are ready."));
}

#[tokio::test]
async fn test_health() {
    let (server, _dir) = setup();
    let (status, body) = get(&server.router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"));
}

// ============================================================================
// Chat Tests
// ============================================================================

#[tokio::test]
async fn test_chat_appends_message_and_reply() {
    let (server, _dir) = setup();
    let router = server.router();

    let output = chat(&router, "hello agents").await;

    assert!(output.success);
    assert_eq!(count_turn_blocks(&output.html), 3);
    assert!(output.html.contains("hello agents"));
    assert_eq!(turns(&router).await, 3);
}

#[tokio::test]
async fn test_empty_chat_leaves_transcript_unchanged() {
    let (server, _dir) = setup();
    let router = server.router();
    chat(&router, "first").await;

    let output = chat(&router, "   ").await;

    assert_eq!(count_turn_blocks(&output.html), 3);
    assert_eq!(turns(&router).await, 3);
}

#[tokio::test]
async fn test_trigger_matches_full_demo_render() {
    let (server, _dir) = setup();
    let router = server.router();

    let output = chat(&router, &format!("Doctor: {}?", DEFAULT_TRIGGER_PHRASE)).await;
    let (status, demo) = get(&router, "/demo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(output.html, demo);
    assert_eq!(count_turn_blocks(&demo), 6);
    assert_eq!(turns(&router).await, 1);
}

#[tokio::test]
async fn test_trigger_without_fixture_shows_notice() {
    let (server, _dir) = setup_with_fixture(None);
    let router = server.router();

    let output = chat(&router, DEFAULT_TRIGGER_PHRASE).await;
    assert!(output.success);
    assert!(output.html.contains("No demo data available"));

    let (status, demo) = get(&router, "/demo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(demo.contains("No demo data available"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_trigger_and_demo_reread_fixture() {
    let (server, dir) = setup();
    let router = server.router();
    let first = chat(&router, DEFAULT_TRIGGER_PHRASE).await;
    assert!(first.html.contains("verdict"));

    std::fs::write(
        dir.path().join("chat.json"),
        r#"{"decision": [{"role": "Decider", "content": "revised verdict"}]}"#,
    )
    .unwrap();

    let (second, (_, demo)) = tokio::join!(
        chat(&router, DEFAULT_TRIGGER_PHRASE),
        get(&router, "/demo"),
    );
    assert_eq!(count_turn_blocks(&second.html), 1);
    assert!(second.html.contains("revised verdict"));
    assert_eq!(second.html, demo);
    assert_eq!(turns(&router).await, 1);
}

#[tokio::test]
async fn test_malformed_json_body_is_rejected() {
    let (server, _dir) = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&server.router(), request).await;
    assert!(status.is_client_error());
}

// ============================================================================
// Demo Stream Tests
// ============================================================================

#[tokio::test]
async fn test_demo_stream_emits_one_snapshot_per_record() {
    let (server, _dir) = setup();
    let router = server.router();

    let (status, body) = get(&router, "/demo/stream").await;

    assert_eq!(status, StatusCode::OK);
    let events = sse_events(&body);
    assert_eq!(events.iter().filter(|e| *e == "snapshot").count(), 6);
    assert_eq!(events.last().map(String::as_str), Some("done"));
    assert!(body.contains("verdict"));
}

#[tokio::test]
async fn test_demo_stream_without_fixture_reports_error() {
    let (server, _dir) = setup_with_fixture(None);

    let (status, body) = get(&server.router(), "/demo/stream").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sse_events(&body), vec!["error".to_string()]);
    assert!(body.contains("No demo data available"));
}

#[tokio::test]
async fn test_demo_stream_after_stop_is_empty() {
    let (server, _dir) = setup();
    let router = server.router();
    server.stop().await.unwrap();

    let (_, body) = get(&router, "/demo/stream").await;

    let events = sse_events(&body);
    assert!(!events.iter().any(|e| e == "snapshot"));
    assert_eq!(events, vec!["done".to_string()]);
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_fnirs_csv_upload_reports_shape() {
    let (server, dir) = setup();
    let router = server.router();

    let (status, body) = post_json(
        &router,
        "/upload/fnirs",
        serde_json::json!({
            "filename": "session1.csv",
            "content": b64(b"time,hbo\n0,0.1\n1,0.2\n"),
            "base64_encoded": true,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let output: ChatOutput = serde_json::from_str(&body).unwrap();
    assert!(output.html.contains("Data shape: 2 rows x 2 columns"));
    assert_eq!(count_turn_blocks(&output.html), 3);

    let stored = files_in(&dir.path().join("uploads").join("fnirs"));
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("fnirs_") && stored[0].ends_with(".csv"));
    assert!(output.html.contains(&stored[0]));
}

#[tokio::test]
async fn test_eeg_non_csv_and_broken_csv() {
    let (server, _dir) = setup();
    let router = server.router();

    let (_, body) = post_json(
        &router,
        "/upload/eeg",
        serde_json::json!({ "filename": "raw.edf", "content": b64(&[0, 1, 2]), "base64_encoded": true }),
    )
    .await;
    assert!(body.contains("Uploaded non-CSV data"));

    let (_, body) = post_json(
        &router,
        "/upload/eeg",
        serde_json::json!({ "filename": "broken.csv", "content": "a,b\n1,2,3\n" }),
    )
    .await;
    assert!(body.contains("Could not parse CSV data"));
    assert_eq!(turns(&router).await, 5);
}

#[tokio::test]
async fn test_video_upload_is_stored() {
    let (server, dir) = setup();
    let router = server.router();

    let (status, body) = post_json(
        &router,
        "/upload/video",
        serde_json::json!({ "filename": "clip.mp4", "content": b64(b"not really a video"), "base64_encoded": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let stored = files_in(&dir.path().join("uploads").join("videos"));
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("video_") && stored[0].ends_with(".mp4"));
    assert!(body.contains("Uploaded video"));
}

#[tokio::test]
async fn test_upload_without_file_shows_notice() {
    let (server, _dir) = setup();
    let router = server.router();

    let (status, body) = post_json(&router, "/upload/video", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No video uploaded"));
    assert_eq!(turns(&router).await, 1);
}

#[tokio::test]
async fn test_upload_errors() {
    let (server, _dir) = setup();
    let router = server.router();

    let (status, body) = post_json(
        &router,
        "/upload/audio",
        serde_json::json!({ "filename": "a.wav", "content": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("\"success\":false"));

    let (status, _) = post_json(
        &router,
        "/upload/eeg",
        serde_json::json!({ "filename": "a.csv", "content": "%%%", "base64_encoded": true }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &router,
        "/upload/eeg",
        serde_json::json!({ "filename": "../..", "content": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(turns(&router).await, 1);
}
