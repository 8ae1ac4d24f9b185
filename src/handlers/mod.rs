pub mod blog;
pub mod users;

use axum::Json;
use serde_json::{Value, json};

/// GET /health. Liveness only; does not touch the database.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
