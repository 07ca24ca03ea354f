use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use gridpost_core::config::GridpostConfig;
use gridpost_store::{AccountStore, PostStore};
use gridpost_twitter::TwitterAuth;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: GridpostConfig,
    pub posts: PostStore,
    pub accounts: AccountStore,
    /// None when no Twitter credentials are configured; the auth callback
    /// then answers with an error instead of panicking.
    pub auth: Option<TwitterAuth>,
}

impl AppState {
    pub fn new(
        config: GridpostConfig,
        posts: PostStore,
        accounts: AccountStore,
        auth: Option<TwitterAuth>,
    ) -> Self {
        Self {
            config,
            posts,
            accounts,
            auth,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/api/schedule/create",
            post(crate::http::schedule::create_handler),
        )
        .route(
            "/api/schedule/read",
            post(crate::http::schedule::read_handler),
        )
        .route(
            "/api/schedule/delete",
            post(crate::http::schedule::delete_handler),
        )
        .route("/api/auth/callback", post(crate::http::auth::callback_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
