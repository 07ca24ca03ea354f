use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::debug;

use gridpost_core::config::TwitterConfig;

use crate::error::{Result, TwitterError};

/// OAuth2 authorization-code exchange and profile lookup.
pub struct TwitterAuth {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    code_verifier: String,
}

/// Response of POST /2/oauth2/token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// The authenticated user's identity from GET /2/users/me.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    data: Profile,
}

impl TwitterAuth {
    pub fn new(config: &TwitterConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            code_verifier: config.code_verifier.clone(),
        }
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Basic auth over the app credentials plus a form body with the PKCE
    /// verifier, per the Twitter OAuth2 confidential-client flow.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let url = format!("{}/2/oauth2/token", self.base_url);
        debug!("exchanging authorization code");

        let resp = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!(
                    "Basic {}",
                    basic_auth_token(&self.client_id, &self.client_secret)
                ),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code_verifier", self.code_verifier.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status,
                message: body,
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| TwitterError::Parse(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(TwitterError::OAuth(
                "token response carried no access token".to_string(),
            ));
        }
        Ok(token)
    }

    /// Resolve the token holder's identity.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
        let url = format!("{}/2/users/me", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status,
                message: body,
            });
        }

        let profile: ProfileResponse = resp
            .json()
            .await
            .map_err(|e| TwitterError::Parse(e.to_string()))?;
        Ok(profile.data)
    }
}

/// `base64(client_id:client_secret)` for the token endpoint's Basic header.
fn basic_auth_token(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{client_id}:{client_secret}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_token_is_standard_base64() {
        // echo -n 'id:secret' | base64
        assert_eq!(basic_auth_token("id", "secret"), "aWQ6c2VjcmV0");
    }

    #[test]
    fn token_response_decodes_with_optional_fields() {
        let body = r#"{"access_token":"tok","token_type":"bearer","expires_in":7200}"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_in, Some(7200));
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn profile_response_decodes() {
        let body = r#"{"data":{"id":"42","name":"Alice","username":"alice"}}"#;
        let profile: ProfileResponse = serde_json::from_str(body).unwrap();
        assert_eq!(profile.data.username, "alice");
    }
}
