use axum::Json;
use serde_json::{json, Value};

/// Liveness check. Independent of upstream or filesystem state.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}
