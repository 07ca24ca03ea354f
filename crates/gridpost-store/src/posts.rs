use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use gridpost_core::types::{Account, NewPost, ScheduledPost};

use crate::{
    db::init_db,
    error::{Result, StoreError},
};

/// Post persistence. Owns its own `Connection` behind a mutex so the HTTP
/// handlers and the publisher can each hold a store without conflicting.
pub struct PostStore {
    conn: Arc<Mutex<Connection>>,
}

impl PostStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new post. The UUID id is generated here; `content` must be
    /// non-empty after trimming.
    pub fn insert(&self, post: NewPost) -> Result<ScheduledPost> {
        let content = post.content.trim().to_string();
        if content.is_empty() {
            return Err(StoreError::Validation(
                "post content is empty".to_string(),
            ));
        }

        let conn = self.conn.lock().unwrap();
        let now_str = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO posts
             (id, owner, content, day_id, scheduled_at, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
            rusqlite::params![
                id,
                post.owner,
                content,
                post.day_id,
                post.scheduled_at.to_rfc3339(),
                now_str
            ],
        )?;
        info!(post_id = %id, owner = %post.owner, at = %post.scheduled_at, "post scheduled");

        Ok(ScheduledPost {
            id,
            owner: post.owner,
            content,
            day_id: post.day_id,
            scheduled_at: post.scheduled_at,
            published: false,
            created_at: now_str.clone(),
            updated_at: now_str,
        })
    }

    /// Delete every post matching the `(owner, content, scheduled_at)`
    /// tuple. Idempotent — deleting an already-deleted post affects zero
    /// rows and is not an error. Database failures are surfaced to the
    /// caller, never swallowed.
    pub fn delete(
        &self,
        owner: &str,
        content: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM posts WHERE owner = ?1 AND content = ?2 AND scheduled_at = ?3",
            rusqlite::params![owner, content.trim(), scheduled_at.to_rfc3339()],
        )?;
        if n > 0 {
            info!(%owner, count = n, "posts deleted");
        }
        Ok(n)
    }

    /// All posts for one owner, ordered by due-time.
    pub fn posts_for_owner(&self, owner: &str) -> Result<Vec<ScheduledPost>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner, content, day_id, scheduled_at, published, created_at, updated_at
             FROM posts WHERE owner = ?1 ORDER BY scheduled_at",
        )?;
        let rows: Vec<RawPost> = stmt
            .query_map([owner], raw_post_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows.into_iter().filter_map(RawPost::into_post).collect())
    }

    /// Every unpublished post joined with its owner's account. The filter
    /// is publish status only — "due" is decided per owner timezone by the
    /// publisher, not by an absolute-time cutoff here.
    pub fn pending_with_accounts(&self) -> Result<Vec<(ScheduledPost, Account)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.owner, p.content, p.day_id, p.scheduled_at, p.published,
                    p.created_at, p.updated_at,
                    a.username, a.user_id, a.access_token, a.timezone,
                    a.created_at, a.updated_at
             FROM posts p
             JOIN accounts a ON a.username = p.owner
             WHERE p.published = 0
             ORDER BY p.scheduled_at",
        )?;
        let rows: Vec<(RawPost, Account)> = stmt
            .query_map([], |row| {
                let post = raw_post_from_row(row)?;
                let account = Account {
                    username: row.get(8)?,
                    user_id: row.get(9)?,
                    access_token: row.get(10)?,
                    timezone: row.get(11)?,
                    created_at: row.get(12)?,
                    updated_at: row.get(13)?,
                };
                Ok((post, account))
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(raw, account)| raw.into_post().map(|p| (p, account)))
            .collect())
    }

    /// Atomically claim a post for delivery: flips `published` to true only
    /// if it is still false. Returns whether this caller won the claim —
    /// a second concurrent claim of the same id sees zero affected rows.
    pub fn claim(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE posts SET published = 1, updated_at = ?2
             WHERE id = ?1 AND published = 0",
            rusqlite::params![id, Utc::now().to_rfc3339()],
        )?;
        Ok(n == 1)
    }

    /// Release a claim after a failed delivery so a later run retries.
    pub fn release(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE posts SET published = 0, updated_at = ?2 WHERE id = ?1",
            rusqlite::params![id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Row image before the timestamp is parsed.
struct RawPost {
    id: String,
    owner: String,
    content: String,
    day_id: u8,
    scheduled_at: String,
    published: bool,
    created_at: String,
    updated_at: String,
}

fn raw_post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
    Ok(RawPost {
        id: row.get(0)?,
        owner: row.get(1)?,
        content: row.get(2)?,
        day_id: row.get::<_, i64>(3)? as u8,
        scheduled_at: row.get(4)?,
        published: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl RawPost {
    /// Drop rows whose stored timestamp no longer parses, with a warning —
    /// one corrupt row must not take down a whole query.
    fn into_post(self) -> Option<ScheduledPost> {
        match DateTime::parse_from_rfc3339(&self.scheduled_at) {
            Ok(at) => Some(ScheduledPost {
                id: self.id,
                owner: self.owner,
                content: self.content,
                day_id: self.day_id,
                scheduled_at: at.with_timezone(&Utc),
                published: self.published,
                created_at: self.created_at,
                updated_at: self.updated_at,
            }),
            Err(e) => {
                warn!(post_id = %self.id, "bad scheduled_at in store: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store_with_account(username: &str) -> PostStore {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO accounts (username, user_id, access_token, timezone, created_at, updated_at)
             VALUES (?1, '42', 'token', 'America/New_York', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            [username],
        )
        .unwrap();
        PostStore::new(conn).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 30).unwrap()
    }

    fn new_post(owner: &str, content: &str) -> NewPost {
        NewPost {
            owner: owner.to_string(),
            content: content.to_string(),
            day_id: 0,
            scheduled_at: at(),
        }
    }

    #[test]
    fn insert_and_read_back() {
        let store = store_with_account("alice");
        let post = store.insert(new_post("alice", "  hello world  ")).unwrap();
        assert_eq!(post.content, "hello world");
        assert_eq!(post.owner, "alice");
        assert!(!post.published);

        let posts = store.posts_for_owner("alice").unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].scheduled_at, at());
        assert_eq!(posts[0].id, post.id);
    }

    #[test]
    fn empty_content_is_rejected() {
        let store = store_with_account("alice");
        let err = store.insert(new_post("alice", "   \n ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.posts_for_owner("alice").unwrap().is_empty());
    }

    #[test]
    fn tuple_delete_is_idempotent() {
        let store = store_with_account("alice");
        store.insert(new_post("alice", "hello")).unwrap();

        assert_eq!(store.delete("alice", "hello", at()).unwrap(), 1);
        assert_eq!(store.delete("alice", "hello", at()).unwrap(), 0);
        assert!(store.posts_for_owner("alice").unwrap().is_empty());
    }

    #[test]
    fn tuple_delete_removes_indistinguishable_duplicates() {
        // Two posts with identical content and timestamp share an identity.
        let store = store_with_account("alice");
        store.insert(new_post("alice", "hello")).unwrap();
        store.insert(new_post("alice", "hello")).unwrap();

        assert_eq!(store.delete("alice", "hello", at()).unwrap(), 2);
    }

    #[test]
    fn claim_is_won_exactly_once() {
        let store = store_with_account("alice");
        let post = store.insert(new_post("alice", "hello")).unwrap();

        assert!(store.claim(&post.id).unwrap());
        assert!(!store.claim(&post.id).unwrap());

        let posts = store.posts_for_owner("alice").unwrap();
        assert!(posts[0].published);
    }

    #[test]
    fn release_makes_a_post_claimable_again() {
        let store = store_with_account("alice");
        let post = store.insert(new_post("alice", "hello")).unwrap();

        assert!(store.claim(&post.id).unwrap());
        store.release(&post.id).unwrap();
        assert!(store.claim(&post.id).unwrap());
    }

    #[test]
    fn pending_join_excludes_published_posts() {
        let store = store_with_account("alice");
        let a = store.insert(new_post("alice", "first")).unwrap();
        store.insert(new_post("alice", "second")).unwrap();

        store.claim(&a.id).unwrap();
        let pending = store.pending_with_accounts().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0.content, "second");
        assert_eq!(pending[0].1.timezone, "America/New_York");
        assert_eq!(pending[0].1.access_token, "token");
    }
}
