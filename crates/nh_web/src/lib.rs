use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use auth::AuthUser;
pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    // The proxy routes answer their own preflights.
    let proxy = Router::new()
        .route("/api/news", get(handlers::news).options(handlers::news_preflight))
        .route(
            "/api/openrouter",
            post(handlers::completion).options(handlers::completion_preflight),
        );

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let account = Router::new()
        .route(
            "/api/articles/save",
            post(handlers::save_article).delete(handlers::unsave_article),
        )
        .route("/api/articles/saved", get(handlers::list_saved))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).post(handlers::set_preferences),
        )
        .layer(cors);

    proxy.merge(account).with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> nh_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 NewsHub server listening on {}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState, AuthUser};
    pub use nh_core::{Error, Result};
}
