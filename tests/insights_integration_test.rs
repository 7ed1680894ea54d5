use anyhow::Result;
use httpmock::prelude::*;
use scholartrack::config::Command;
use scholartrack::core::insights::response_schema;
use scholartrack::core::repository::default_subjects;
use scholartrack::core::InsightProvider;
use scholartrack::{GeminiClient, LocalStorage, Settings, TrackerApp, TrackerError};
use tempfile::TempDir;

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn reply_with(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn insight_text() -> String {
    serde_json::json!({
        "summary": "Strong project work, exams lag behind target.",
        "strengths": ["Algorithm design"],
        "weaknesses": ["Timed exams"],
        "tips": ["Practice past papers", "Use spaced repetition", "Review calculus weekly"]
    })
    .to_string()
}

fn settings(server: &MockServer, dir: &TempDir) -> Settings {
    Settings {
        data_dir: dir.path().to_str().unwrap().to_string(),
        api_key: Some("test-key".to_string()),
        model: "gemini-2.5-flash".to_string(),
        api_endpoint: server.base_url(),
        json_logs: false,
    }
}

#[tokio::test]
async fn test_insights_request_and_render() -> Result<()> {
    let server = MockServer::start();
    let temp_dir = TempDir::new()?;

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .header("x-goog-api-key", "test-key")
            .body_contains("\"responseMimeType\":\"application/json\"")
            .body_contains("Midterm Exam: 85/100")
            .body_contains("85.8%");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(reply_with(&insight_text()));
    });

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let mut app = TrackerApp::load(storage, settings(&server, &temp_dir)).await;
    let output = app.run(&Command::Insights).await?;

    api_mock.assert();
    assert!(output.contains("Strong project work"));
    assert!(output.contains("  • Algorithm design"));
    assert!(output.contains("  3. Review calculus weekly"));
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_reported_once() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(503).body("overloaded");
    });

    let client = GeminiClient::new("test-key", "gemini-2.5-flash", server.base_url());
    let err = client.generate("prompt", &response_schema()).await.unwrap_err();

    api_mock.assert_hits(1);
    match &err {
        TrackerError::InsightStatusError { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rejected_key_is_not_retryable() -> Result<()> {
    let server = MockServer::start();
    let temp_dir = TempDir::new()?;
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(403)
            .json_body(serde_json::json!({ "error": { "code": 403, "status": "PERMISSION_DENIED" } }));
    });

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let mut app = TrackerApp::load(storage, settings(&server, &temp_dir)).await;
    let err = app.run(&Command::Insights).await.unwrap_err();

    api_mock.assert_hits(1);
    assert!(matches!(err, TrackerError::InsightStatusError { status: 403, .. }));
    assert!(!err.is_retryable());
    assert_eq!(err.exit_code(), 1);
    assert!(err.user_friendly_message().contains("rejected the API key (HTTP 403)"));
    assert!(err.recovery_suggestion().contains("--api-key"));
    Ok(())
}

#[tokio::test]
async fn test_reply_missing_fields_fails() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200)
            .json_body(reply_with(r#"{"summary":"only a summary"}"#));
    });

    let client = GeminiClient::new("test-key", "gemini-2.5-flash", server.base_url());
    let err = client.generate("prompt", &response_schema()).await.unwrap_err();

    api_mock.assert();
    assert!(matches!(err, TrackerError::InsightError { .. }));
}

#[tokio::test]
async fn test_empty_candidates_means_no_data() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(serde_json::json!({ "candidates": [] }));
    });

    let client = GeminiClient::new("test-key", "gemini-2.5-flash", server.base_url());
    let err = client.generate("prompt", &response_schema()).await.unwrap_err();

    api_mock.assert();
    assert_eq!(err.user_friendly_message(), "No data returned from AI");
}

#[tokio::test]
async fn test_manual_retry_after_failure() -> Result<()> {
    let server = MockServer::start();
    let temp_dir = TempDir::new()?;

    let mut failing = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(500);
    });

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let mut app = TrackerApp::load(storage, settings(&server, &temp_dir)).await;
    assert!(app.run(&Command::Insights).await.is_err());
    failing.assert_hits(1);
    failing.delete();

    let working = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(reply_with(&insight_text()));
    });
    let output = app.run(&Command::Insights).await?;
    working.assert();
    assert!(output.contains("Actionable Study Tips"));

    // insights never touch the stored subjects
    assert_eq!(app.tracker().subjects(), default_subjects().as_slice());
    Ok(())
}
