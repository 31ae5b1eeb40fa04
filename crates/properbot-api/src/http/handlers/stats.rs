//! Dashboard stats handler.
//!
//! GET /api/v1/stats - session, message, and cached-listing counts.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use properbot_core::chat::repository::ChatRepository;
use properbot_core::listing::cache::ListingCache;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/stats - Aggregate counts for the dashboard.
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.chat_service.chat_repo().count_sessions().await?;
    let messages = state.chat_service.chat_repo().count_messages().await?;
    let cached_listings = state.listing_cache.count_listings().await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let stats = serde_json::json!({
        "sessions": sessions,
        "messages": messages,
        "cached_listings": cached_listings,
        "model": state.config.model,
    });

    let resp = ApiResponse::success(stats, request_id, elapsed).with_link("self", "/api/v1/stats");
    Ok(Json(resp))
}
