use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

mod app;
mod http;

#[derive(Parser, Debug)]
#[command(name = "gridpost-daemon", about = "Gridpost scheduling daemon")]
struct Args {
    /// Path to gridpost.toml (default: ~/.gridpost/gridpost.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gridpost_daemon=info,gridpost_publisher=info,tower_http=debug".into()
            }),
        )
        .init();

    let args = Args::parse();
    let config = gridpost_core::config::GridpostConfig::load(args.config.as_deref())
        .unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            gridpost_core::config::GridpostConfig::default()
        });

    let bind = config.server.bind.clone();
    let port = config.server.port;

    // initialize SQLite database — single file for all subsystems
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    gridpost_store::db::init_db(&db)?;
    info!("database migrations complete");

    // build subsystems — each gets its own connection for thread safety
    let posts = gridpost_store::PostStore::new(rusqlite::Connection::open(db_path)?)?;
    let accounts = gridpost_store::AccountStore::new(rusqlite::Connection::open(db_path)?)?;

    let delivery = build_delivery(&config)?;
    let auth = config
        .twitter
        .as_ref()
        .map(gridpost_twitter::TwitterAuth::new);

    // publisher: separate store connection so its minute loop never
    // contends with HTTP handlers for a statement lock
    let engine = gridpost_publisher::PublisherEngine::new(
        gridpost_store::PostStore::new(rusqlite::Connection::open(db_path)?)?,
        delivery,
        Duration::from_secs(config.publisher.interval_secs),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move { engine.run(shutdown_rx).await });

    let state = Arc::new(app::AppState::new(config, posts, accounts, auth));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Gridpost daemon listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;
    Ok(())
}

/// Resolves on ctrl-c and broadcasts the stop flag so the publisher loop
/// exits alongside the HTTP server.
async fn shutdown_signal(shutdown_tx: tokio::sync::watch::Sender<bool>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
}

/// Build the delivery backend from config.
///
/// Without Twitter credentials the daemon still runs — posts can be
/// scheduled and read — but every due delivery fails until credentials are
/// configured.
fn build_delivery(
    config: &gridpost_core::config::GridpostConfig,
) -> anyhow::Result<Arc<dyn gridpost_core::Delivery>> {
    match config.twitter {
        Some(ref twitter) => {
            info!(base_url = %twitter.base_url, "delivery backend: twitter");
            Ok(Arc::new(gridpost_twitter::TwitterClient::new(
                Some(twitter.base_url.clone()),
                Duration::from_secs(config.publisher.delivery_timeout_secs),
            )?))
        }
        None => {
            tracing::warn!("No twitter credentials configured — deliveries will fail");
            Ok(Arc::new(NullDelivery))
        }
    }
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

/// Placeholder backend when no platform credentials are available.
struct NullDelivery;

#[async_trait::async_trait]
impl gridpost_core::Delivery for NullDelivery {
    fn name(&self) -> &str {
        "null"
    }

    async fn deliver(
        &self,
        _account: &gridpost_core::types::Account,
        _content: &str,
    ) -> Result<String, gridpost_core::DeliveryError> {
        Err(gridpost_core::DeliveryError::Unavailable(
            "no delivery backend configured — set twitter.client_id in gridpost.toml".into(),
        ))
    }
}
