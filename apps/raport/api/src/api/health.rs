//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// Fixed liveness payload; no dependencies are checked.
pub async fn healthz_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
