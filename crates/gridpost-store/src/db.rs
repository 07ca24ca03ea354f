use rusqlite::Connection;

use crate::error::Result;

/// Initialise the Gridpost schema in `conn`.
///
/// Safe to call on every startup — CREATE IF NOT EXISTS means it's
/// idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS accounts (
            username     TEXT    NOT NULL PRIMARY KEY,
            user_id      TEXT    NOT NULL,
            access_token TEXT    NOT NULL,
            timezone     TEXT    NOT NULL DEFAULT 'UTC',
            created_at   TEXT    NOT NULL,
            updated_at   TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS posts (
            id           TEXT    NOT NULL PRIMARY KEY,
            owner        TEXT    NOT NULL REFERENCES accounts(username),
            content      TEXT    NOT NULL,
            day_id       INTEGER NOT NULL,
            scheduled_at TEXT    NOT NULL,   -- ISO-8601 UTC instant
            published    INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT    NOT NULL,
            updated_at   TEXT    NOT NULL
        ) STRICT;

        -- Hot path for the publisher: SELECT … WHERE published = 0
        CREATE INDEX IF NOT EXISTS idx_posts_pending
            ON posts (published, scheduled_at);
        -- Tuple-addressed delete and per-owner grid reads.
        CREATE INDEX IF NOT EXISTS idx_posts_owner
            ON posts (owner, scheduled_at);
        ",
    )?;
    Ok(())
}
