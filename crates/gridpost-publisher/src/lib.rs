//! `gridpost-publisher` — the periodic due-post matcher.
//!
//! # Overview
//!
//! [`engine::PublisherEngine`] wakes on a fixed cadence (one minute by
//! default), truncates "now" to the current minute window and walks every
//! unpublished post. A post is due when its `scheduled_at` has arrived in
//! its owner's timezone — anything due and still unpublished is eligible,
//! however long ago its own minute passed, so a post whose delivery kept
//! failing is retried instead of silently stranded.
//!
//! Delivery is at-most-once per run: the engine claims a post with an
//! atomic conditional update before calling the backend, and releases the
//! claim only when delivery fails. Each run returns a [`types::RunReport`]
//! with per-post outcomes.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::PublisherEngine;
pub use error::{PublisherError, Result};
pub use types::{Outcome, PostOutcome, RunReport};
