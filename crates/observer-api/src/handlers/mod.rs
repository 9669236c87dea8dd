//! HTTP handlers for observer-api.

pub mod products;
pub mod users;

use axum::{extract::rejection::JsonRejection, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

pub use products::{create_product, delete_product, get_product, update_product};
pub use users::{create_user, delete_user, get_user, update_user};

/// Liveness probe. Does not go through the request log pipeline.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Request body as recorded on the request log.
fn logged_body<T: Serialize>(payload: &Result<Json<T>, JsonRejection>) -> JsonValue {
    match payload {
        Ok(Json(body)) => serde_json::to_value(body).unwrap_or(JsonValue::Null),
        Err(rejection) => json!({ "rejected": rejection.body_text() }),
    }
}
