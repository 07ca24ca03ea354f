use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use gridpost_core::GridpostError;

pub mod auth;
pub mod health;
pub mod schedule;

/// Uniform error payload: `{ "error": msg, "code": err.code() }`.
pub(crate) fn error_response(
    status: StatusCode,
    err: &GridpostError,
) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "error": err.to_string(), "code": err.code() })),
    )
}
