//! `gridpost-core` — shared types, configuration and errors for Gridpost.
//!
//! Everything here is consumed by at least two sibling crates: the post and
//! account records, the delivery seam the publisher drives, the figment-based
//! config loader and the top-level error enum the HTTP layer maps to
//! responses.

pub mod config;
pub mod deliver;
pub mod error;
pub mod types;

pub use deliver::{Delivery, DeliveryError};
pub use error::{GridpostError, Result};
pub use types::{Account, NewPost, ScheduledPost};
