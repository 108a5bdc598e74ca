//! HTTP request handlers
//!
//! Successful calls answer `{"status": 1, "data": <snapshot>}`; `data` is
//! omitted for tweet actions, whose effect arrives over `/events`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use twmod_common::events::SessionSnapshot;

use super::server::AppContext;
use crate::error::Result;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<SessionSnapshot>,
}

impl ApiResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            status: 1,
            data: None,
        })
    }

    fn with(snapshot: SessionSnapshot) -> Json<Self> {
        Json(Self {
            status: 1,
            data: Some(snapshot),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WatchParams {
    language: Option<String>,
}

// ============================================================================
// Health and State
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "twmod-mq".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /state - current session snapshot
pub async fn get_state(State(ctx): State<AppContext>) -> Json<ApiResponse> {
    ApiResponse::with(ctx.engine.snapshot().await)
}

// ============================================================================
// Tracking Control
// ============================================================================

/// GET /watch/:hashtag?language=xx - start tracking a hashtag
///
/// The leading `#` is optional (and must be sent as `%23` if present).
pub async fn watch(
    State(ctx): State<AppContext>,
    Path(hashtag): Path<String>,
    Query(params): Query<WatchParams>,
) -> Result<Json<ApiResponse>> {
    debug!("Watch requested: {} (language={:?})", hashtag, params.language);
    let snapshot = ctx
        .engine
        .start_tracking(&hashtag, params.language.as_deref())
        .await?;
    Ok(ApiResponse::with(snapshot))
}

/// GET /stop
pub async fn stop(State(ctx): State<AppContext>) -> Json<ApiResponse> {
    ApiResponse::with(ctx.engine.stop_tracking().await)
}

/// GET /clear
pub async fn clear(State(ctx): State<AppContext>) -> Json<ApiResponse> {
    ApiResponse::with(ctx.engine.clear().await)
}

// ============================================================================
// Moderator Actions
// ============================================================================

/// GET /tweet/:id/approve
pub async fn approve(
    State(ctx): State<AppContext>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>> {
    ctx.engine.approve(id).await?;
    Ok(ApiResponse::ok())
}

/// GET /tweet/:id/reject
pub async fn reject(
    State(ctx): State<AppContext>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>> {
    ctx.engine.reject(id).await?;
    Ok(ApiResponse::ok())
}

/// DELETE /tweet/:id
pub async fn delete_tweet(
    State(ctx): State<AppContext>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>> {
    ctx.engine.delete(id).await?;
    Ok(ApiResponse::ok())
}

// ============================================================================
// Adaptive Routing
// ============================================================================

/// GET /ai/enable
pub async fn enable_adaptive(State(ctx): State<AppContext>) -> Json<ApiResponse> {
    ApiResponse::with(ctx.engine.set_adaptive(true).await)
}

/// GET /ai/disable
pub async fn disable_adaptive(State(ctx): State<AppContext>) -> Json<ApiResponse> {
    ApiResponse::with(ctx.engine.set_adaptive(false).await)
}
