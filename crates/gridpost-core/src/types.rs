use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted scheduled post.
///
/// `scheduled_at` is the authoritative due-time, computed once when the post
/// is created and never recomputed. `day_id` is a denormalized, human-facing
/// view of it; the grid cell is always re-derivable from `scheduled_at` plus
/// the owner's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    /// UUID v4 string — primary key, generated at the storage boundary.
    pub id: String,
    /// Owning account username.
    pub owner: String,
    /// Post body. Non-empty after trimming.
    pub content: String,
    /// Day of week in the owner's calendar, 0 = Sunday … 6 = Saturday.
    pub day_id: u8,
    /// Absolute UTC due-time.
    pub scheduled_at: DateTime<Utc>,
    /// False until delivery succeeds.
    pub published: bool,
    /// ISO-8601 timestamp of row creation.
    pub created_at: String,
    /// ISO-8601 timestamp of the last state change.
    pub updated_at: String,
}

/// Input for creating a post, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub owner: String,
    pub content: String,
    pub day_id: u8,
    pub scheduled_at: DateTime<Utc>,
}

/// A social-platform account with its delivery credential and display
/// timezone. The publisher evaluates due windows in `timezone`; the delivery
/// client authenticates with `access_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Platform username — primary key.
    pub username: String,
    /// Platform-assigned user id.
    pub user_id: String,
    /// OAuth2 bearer token used for delivery.
    pub access_token: String,
    /// IANA timezone identifier, e.g. "America/New_York". Defaults to "UTC".
    pub timezone: String,
    pub created_at: String,
    pub updated_at: String,
}
