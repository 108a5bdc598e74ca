//! HTTP server setup and routing
//!
//! All moderation routes are plain GETs except delete, so a dashboard can
//! drive them from links. State changes reach clients through `/events`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{handlers, sse};
use crate::engine::ModerationEngine;
use crate::error::{Error, Result};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub engine: Arc<ModerationEngine>,
}

impl AppContext {
    pub fn new(engine: Arc<ModerationEngine>) -> Self {
        Self { engine }
    }
}

/// Build the router with every route attached
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/state", get(handlers::get_state))
        // Tracking control
        .route("/watch/:hashtag", get(handlers::watch))
        .route("/stop", get(handlers::stop))
        .route("/clear", get(handlers::clear))
        // Moderator actions
        .route("/tweet/:id/approve", get(handlers::approve))
        .route("/tweet/:id/reject", get(handlers::reject))
        .route("/tweet/:id", delete(handlers::delete_tweet))
        // Adaptive routing
        .route("/ai/enable", get(handlers::enable_adaptive))
        .route("/ai/disable", get(handlers::disable_adaptive))
        // SSE event stream
        .route("/events", get(sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the API on `port` until `shutdown` resolves
pub async fn run(
    ctx: AppContext,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("twmod-mq listening on http://{}", addr);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
