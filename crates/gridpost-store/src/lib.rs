//! `gridpost-store` — SQLite persistence for accounts and scheduled posts.
//!
//! Posts get a UUID primary key at this boundary; the externally visible
//! delete operation still addresses a post by its `(owner, content,
//! scheduled_at)` tuple. The id exists so the publisher's claim —
//! `UPDATE … SET published = 1 WHERE id = ? AND published = 0` — has an
//! unambiguous target, which is what makes delivery at-most-once.

pub mod accounts;
pub mod db;
pub mod error;
pub mod posts;

pub use accounts::AccountStore;
pub use error::{Result, StoreError};
pub use posts::PostStore;
