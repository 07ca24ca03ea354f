//! `gridpost-twitter` — Twitter/X API v2 client.
//!
//! Two concerns: posting tweets on behalf of an account (the production
//! [`gridpost_core::Delivery`] backend) and the OAuth2 authorization-code
//! exchange that produces `(user_id, username, access_token)` for the
//! account store.

pub mod client;
pub mod error;
pub mod oauth;

pub use client::TwitterClient;
pub use error::{Result, TwitterError};
pub use oauth::{Profile, TokenResponse, TwitterAuth};
