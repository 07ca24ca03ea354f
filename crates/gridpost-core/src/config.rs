use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8390;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Publisher cadence. One minute is the finest unit the grid models, so a
/// shorter interval buys nothing.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
/// Per-delivery HTTP timeout. A timed-out delivery is a failure, not a
/// fatal job error.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Top-level config (gridpost.toml + GRIDPOST_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridpostConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    pub twitter: Option<TwitterConfig>,
}

impl Default for GridpostConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            publisher: PublisherConfig::default(),
            twitter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Seconds between matcher runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Per-delivery HTTP timeout in seconds.
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
        }
    }
}

/// Twitter/X application credentials. When absent the daemon starts without
/// a delivery backend and the publisher logs every due post as failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    pub client_id: String,
    pub client_secret: String,
    /// OAuth2 redirect URI registered with the application.
    pub redirect_uri: String,
    /// PKCE code verifier matching the challenge the UI sends.
    pub code_verifier: String,
    #[serde(default = "default_twitter_base_url")]
    pub base_url: String,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.gridpost/gridpost.db", home)
}
fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}
fn default_delivery_timeout_secs() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_SECS
}
fn default_twitter_base_url() -> String {
    "https://api.twitter.com".to_string()
}

impl GridpostConfig {
    /// Load config from a TOML file with GRIDPOST_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.gridpost/gridpost.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        let config: GridpostConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("GRIDPOST_").split("_"))
            .extract()
            .map_err(|e| crate::error::GridpostError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.gridpost/gridpost.toml", home)
}
