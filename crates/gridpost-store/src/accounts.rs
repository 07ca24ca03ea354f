use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use gridpost_core::types::Account;

use crate::{db::init_db, error::Result};

/// Account persistence for the OAuth callback and the grid read path.
pub struct AccountStore {
    conn: Arc<Mutex<Connection>>,
}

impl AccountStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create or refresh an account. A re-authenticating username keeps its
    /// row and gets the new token (and timezone, if it changed).
    pub fn upsert(
        &self,
        username: &str,
        user_id: &str,
        access_token: &str,
        timezone: &str,
    ) -> Result<Account> {
        let conn = self.conn.lock().unwrap();
        let now_str = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO accounts (username, user_id, access_token, timezone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(username) DO UPDATE SET
                 user_id = excluded.user_id,
                 access_token = excluded.access_token,
                 timezone = excluded.timezone,
                 updated_at = excluded.updated_at",
            rusqlite::params![username, user_id, access_token, timezone, now_str],
        )?;
        info!(%username, %timezone, "account upserted");

        // Read back so created_at reflects the original row on refresh.
        let account = query_account(&conn, username)?;
        account.ok_or_else(|| crate::error::StoreError::AccountNotFound {
            username: username.to_string(),
        })
    }

    pub fn get(&self, username: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        query_account(&conn, username)
    }
}

fn query_account(conn: &Connection, username: &str) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            "SELECT username, user_id, access_token, timezone, created_at, updated_at
             FROM accounts WHERE username = ?1",
            [username],
            |row| {
                Ok(Account {
                    username: row.get(0)?,
                    user_id: row.get(1)?,
                    access_token: row.get(2)?,
                    timezone: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AccountStore {
        AccountStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn upsert_creates_then_refreshes() {
        let accounts = store();
        let created = accounts
            .upsert("alice", "42", "token-1", "America/New_York")
            .unwrap();
        assert_eq!(created.access_token, "token-1");

        let refreshed = accounts
            .upsert("alice", "42", "token-2", "America/New_York")
            .unwrap();
        assert_eq!(refreshed.access_token, "token-2");
        assert_eq!(refreshed.created_at, created.created_at);
    }

    #[test]
    fn get_missing_account_is_none() {
        assert!(store().get("nobody").unwrap().is_none());
    }
}
