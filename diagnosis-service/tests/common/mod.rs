//! Test helpers for diagnosis-service integration tests.
//!
//! Provides a fake chat-completions upstream and an application launcher,
//! so the whole request path runs over real sockets without leaving the host.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use diagnosis_service::config::DiagnosisConfig;
use diagnosis_service::Application;
use serde_json::{json, Value};
use service_core::config::Config;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "sk-or-test-key";

pub const FULL_REQUEST_MESSAGE: &str = "Vehicle info: AB12CDE, Ford Focus, 2018, Petrol, Manual, \
     54000 miles. Symptom/Fault Code: Engine misfire on cold start. \
     Recent Work: Spark plugs replaced last month";

pub fn full_request_body() -> Value {
    json!({
        "REG": "AB12CDE",
        "MAKE": "Ford",
        "MODEL": "Focus",
        "YEAR": 2018,
        "FUEL": "Petrol",
        "TRANSMISSION": "Manual",
        "MILEAGE": 54000,
        "SYMPTOM": "Engine misfire on cold start",
        "RECENT_WORK": "Spark plugs replaced last month"
    })
}

/// Service config bound to a random port, built from the given variables.
pub fn test_config(vars: &[(&str, &str)]) -> DiagnosisConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    DiagnosisConfig::from_lookup(Config { port: 0 }, |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

/// What the fake upstream received.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

/// How the fake upstream answers.
#[derive(Debug, Clone)]
pub struct UpstreamBehavior {
    pub status: StatusCode,
    pub body: String,
    pub delay: Option<Duration>,
}

impl UpstreamBehavior {
    pub fn completion(content: &str) -> Self {
        Self::respond(
            StatusCode::OK,
            json!({
                "id": "gen-test",
                "model": "openai/gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "finish_reason": "stop",
                    "message": { "role": "assistant", "content": content }
                }]
            })
            .to_string(),
        )
    }

    pub fn respond(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone)]
struct UpstreamState {
    behavior: UpstreamBehavior,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// A local stand-in for the chat-completions API.
pub struct FakeUpstream {
    pub url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeUpstream {
    pub async fn spawn(behavior: UpstreamBehavior) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            behavior,
            captured: captured.clone(),
        };

        let router = Router::new()
            .route("/api/v1/chat/completions", post(chat_completions))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            url: format!("http://127.0.0.1:{}/api/v1/chat/completions", port),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

async fn chat_completions(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
    state
        .captured
        .lock()
        .unwrap()
        .push(CapturedRequest { headers, body });

    if let Some(delay) = state.behavior.delay {
        tokio::time::sleep(delay).await;
    }

    (
        state.behavior.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.behavior.body.clone(),
    )
}

/// Spawn the real application (real HTTP client) and return its base URL.
pub async fn spawn_app(config: DiagnosisConfig) -> String {
    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    format!("http://127.0.0.1:{}", port)
}

/// A URL on a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind scratch listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/v1/chat/completions", port)
}
