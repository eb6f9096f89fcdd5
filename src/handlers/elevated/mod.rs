// handlers/elevated/mod.rs - Elevated handlers (ADMIN role required)
//
// Security Level: HTTP Basic authentication, role ADMIN
// Route Prefix: /actuator/*
// Middleware: require_admin

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::cache::CacheStats;

/// GET /actuator/caches - cache sizes and hit counters
pub async fn caches_get(State(state): State<AppState>) -> ApiResult<CacheStats> {
    Ok(ApiResponse::success(state.employees.cache_stats().await))
}

/// DELETE /actuator/caches - drop every cached entry
pub async fn caches_delete(State(state): State<AppState>) -> ApiResult<()> {
    state.employees.clear_caches().await;
    Ok(ApiResponse::<()>::no_content())
}
