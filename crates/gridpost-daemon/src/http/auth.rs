use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use gridpost_core::GridpostError;

use crate::app::AppState;
use crate::http::error_response;

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    /// OAuth2 authorization code from the platform redirect.
    pub code: String,
    /// IANA timezone the UI detected for the viewer.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// POST /api/auth/callback — exchange the authorization code, resolve the
/// profile and upsert the account with its timezone. A returning username
/// gets its token refreshed.
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let auth = state.auth.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &GridpostError::Config("twitter credentials are not configured".into()),
        )
    })?;

    let token = auth.exchange_code(&req.code).await.map_err(auth_error)?;
    let profile = auth.fetch_profile(&token.access_token).await.map_err(auth_error)?;

    let account = state
        .accounts
        .upsert(
            &profile.username,
            &profile.id,
            &token.access_token,
            &req.timezone,
        )
        .map_err(|e| {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &GridpostError::Database(e.to_string()),
            )
        })?;

    info!(username = %account.username, "account authenticated");
    // The access token stays server-side; the UI only needs the identity.
    Ok(Json(json!({
        "data": {
            "username": account.username,
            "user_id": account.user_id,
            "timezone": account.timezone,
        }
    })))
}

fn auth_error(e: gridpost_twitter::TwitterError) -> (StatusCode, Json<Value>) {
    error_response(StatusCode::BAD_REQUEST, &GridpostError::AuthFailed(e.to_string()))
}
