use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use gridpost_core::deliver::{Delivery, DeliveryError};
use gridpost_core::types::Account;

use crate::error::{Result, TwitterError};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Tweet-posting client. One instance is shared by the publisher; the
/// bearer token comes from the owning account per call.
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
}

impl TwitterClient {
    /// Build a client with a per-request timeout. A timed-out delivery
    /// surfaces as an ordinary request error, never a panic or a hang.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// POST /2/tweets — returns the id of the created tweet.
    pub async fn post_tweet(&self, access_token: &str, text: &str) -> Result<String> {
        let url = format!("{}/2/tweets", self.base_url);
        debug!(len = text.len(), "posting tweet");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json")
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "Twitter API error");
            return Err(TwitterError::Api {
                status,
                message: body,
            });
        }

        let tweet: TweetResponse = resp
            .json()
            .await
            .map_err(|e| TwitterError::Parse(e.to_string()))?;
        Ok(tweet.data.id)
    }
}

#[async_trait]
impl Delivery for TwitterClient {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn deliver(
        &self,
        account: &Account,
        content: &str,
    ) -> std::result::Result<String, DeliveryError> {
        self.post_tweet(&account.access_token, content)
            .await
            .map_err(|e| match e {
                TwitterError::Api { status, message } => DeliveryError::Api { status, message },
                TwitterError::Http(e) => DeliveryError::Network(e.to_string()),
                TwitterError::Parse(m) => DeliveryError::Parse(m),
                TwitterError::OAuth(m) => DeliveryError::Unavailable(m),
            })
    }
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}
