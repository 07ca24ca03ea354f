use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use gridpost_core::{GridpostError, NewPost};
use gridpost_schedule::{
    format_hour_label, parse_timezone, resolve_scheduled_at, week_dates, GridSlot, ScheduleError,
    WeekGrid, DAY_NAMES,
};
use gridpost_store::StoreError;

use crate::app::AppState;
use crate::http::error_response;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub profile: String,
    pub content: String,
    pub day_id: u8,
    pub hour: u8,
    pub minute: u8,
    #[serde(default)]
    pub week_offset: i32,
}

/// POST /api/schedule/create — resolve the grid selection against the
/// owner's timezone and persist the post. Validation problems (bad slot,
/// past instant, empty content, unknown account) come back as 400 with a
/// message; they never crash the request path.
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRequest>,
) -> ApiResult {
    let account = lookup_account(&state, &req.profile)?;
    let tz = parse_timezone(&account.timezone).map_err(bad_request)?;

    let slot = GridSlot {
        day_id: req.day_id,
        hour: req.hour,
        minute: req.minute,
    };
    let scheduled_at =
        resolve_scheduled_at(slot, req.week_offset, tz, Utc::now()).map_err(bad_request)?;

    let post = state
        .posts
        .insert(NewPost {
            owner: req.profile,
            content: req.content,
            day_id: req.day_id,
            scheduled_at,
        })
        .map_err(store_error)?;

    Ok(Json(json!({ "data": post })))
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub profile: String,
    #[serde(default)]
    pub week_offset: i32,
}

/// POST /api/schedule/read — every post for the account placed onto a
/// fresh grid, plus the headings and dates of the requested week.
pub async fn read_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReadRequest>,
) -> ApiResult {
    let account = lookup_account(&state, &req.profile)?;
    let tz = parse_timezone(&account.timezone).map_err(bad_request)?;

    let posts = state.posts.posts_for_owner(&req.profile).map_err(store_error)?;
    let mut grid = WeekGrid::empty();
    for post in &posts {
        grid.place(post, tz);
    }

    let labels: Vec<String> = (0u8..24).map(format_hour_label).collect();
    Ok(Json(json!({
        "data": grid.rows,
        "headings": DAY_NAMES,
        "dates": week_dates(req.week_offset, tz, Utc::now()),
        "labels": labels,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub profile: String,
    pub content: String,
    /// RFC 3339 UTC instant identifying the post together with profile and
    /// content.
    pub timestamp: String,
}

/// POST /api/schedule/delete — tuple-addressed delete. Idempotent: zero
/// affected rows is a success. Store failures are surfaced, not swallowed,
/// so the UI never shows a post the server failed to remove.
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> ApiResult {
    let scheduled_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&req.timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            error_response(
                StatusCode::BAD_REQUEST,
                &GridpostError::Validation(format!("bad timestamp: {e}")),
            )
        })?;

    let deleted = state
        .posts
        .delete(&req.profile, &req.content, scheduled_at)
        .map_err(store_error)?;

    Ok(Json(json!({ "data": { "deleted": deleted } })))
}

fn lookup_account(
    state: &AppState,
    profile: &str,
) -> Result<gridpost_core::types::Account, (StatusCode, Json<Value>)> {
    match state.accounts.get(profile) {
        Ok(Some(account)) => Ok(account),
        Ok(None) => Err(error_response(
            StatusCode::BAD_REQUEST,
            &GridpostError::AccountNotFound {
                username: profile.to_string(),
            },
        )),
        Err(e) => Err(store_error(e)),
    }
}

fn bad_request(e: ScheduleError) -> (StatusCode, Json<Value>) {
    error_response(
        StatusCode::BAD_REQUEST,
        &GridpostError::Validation(e.to_string()),
    )
}

/// Lift a store failure into the shared error enum so the payload code
/// comes from one place.
fn store_error(e: StoreError) -> (StatusCode, Json<Value>) {
    let (status, err) = match e {
        StoreError::Validation(message) => {
            (StatusCode::BAD_REQUEST, GridpostError::Validation(message))
        }
        StoreError::AccountNotFound { username } => (
            StatusCode::BAD_REQUEST,
            GridpostError::AccountNotFound { username },
        ),
        StoreError::Database(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            GridpostError::Database(e.to_string()),
        ),
    };
    error_response(status, &err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_errors_map_to_validation_code() {
        let (status, body) = bad_request(ScheduleError::InvalidSlot("minute 75".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["code"], "VALIDATION_ERROR");
        assert!(body.0["error"].as_str().unwrap().contains("minute 75"));
    }

    #[test]
    fn store_errors_carry_shared_codes_and_statuses() {
        let (status, body) = store_error(StoreError::Validation("post content is empty".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["code"], "VALIDATION_ERROR");

        let (status, body) = store_error(StoreError::AccountNotFound {
            username: "alice".into(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["code"], "ACCOUNT_NOT_FOUND");
        assert!(body.0["error"].as_str().unwrap().contains("alice"));

        let (status, body) = store_error(StoreError::Database(rusqlite::Error::InvalidQuery));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["code"], "DATABASE_ERROR");
    }
}
