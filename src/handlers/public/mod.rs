// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: /, /health, /actuator/health, /actuator/info

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::config;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "endpoints": {
            "employees": "/api/v1/employees[/:id] (USER)",
            "search": "/api/v1/employees/search?name=&role= (USER)",
            "role": "/api/v1/employees/role/:role (USER)",
            "count": "/api/v1/employees/count (USER)",
            "health": "/health, /actuator/health (public)",
            "info": "/actuator/info (public)",
            "caches": "/actuator/caches (ADMIN)",
        }
    }))
}

/// GET /health and /actuator/health - storage reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.employees.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "UP",
                "timestamp": now,
                "components": { "db": { "status": "UP" } }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "DOWN",
                    "timestamp": now,
                    "components": { "db": { "status": "DOWN" } }
                })),
            )
        }
    }
}

/// GET /actuator/info - build and runtime information
pub async fn info() -> Json<Value> {
    let config = config::config();
    Json(json!({
        "app": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "environment": config.environment,
        }
    }))
}
