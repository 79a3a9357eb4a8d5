//! Liveness and metrics endpoints against a running server.

mod common;

use common::{spawn_app, test_config};
use reqwest::Client;
use std::time::Duration;

#[tokio::test]
async fn health_check_returns_ok_true() {
    let base = spawn_app(test_config(&[])).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn health_check_ignores_upstream_state() {
    let config = test_config(&[(
        "DIAGNOSIS_COMPLETION_URL",
        "http://127.0.0.1:1/api/v1/chat/completions",
    )]);
    let base = spawn_app(config).await;

    let response = Client::new()
        .get(format!("{}/health", base))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn caller_request_id_is_echoed() {
    let base = spawn_app(test_config(&[])).await;

    let response = Client::new()
        .get(format!("{}/health", base))
        .header("x-request-id", "diag-42")
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.headers()["x-request-id"], "diag-42");
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let base = spawn_app(test_config(&[])).await;

    let response = Client::new()
        .get(format!("{}/metrics", base))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}
