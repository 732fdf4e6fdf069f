//! Request handlers, grouped the way the route table reads.

pub mod admin;
pub mod ads;
pub mod chat;
pub mod notices;
pub mod site;
pub mod support;

use axum::Json;
use serde_json::{json, Value};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
