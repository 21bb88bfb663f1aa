// handlers/public/mod.rs - no authentication required
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::server::AppState;

/// GET / - service descriptor
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "store": state.store.backend(),
            "endpoints": {
                "public": ["/", "/health"],
                "timetable": [
                    "/api/timetable",
                    "/api/timetable/check",
                    "/api/timetable/:id",
                    "/api/timetable/section/:id",
                    "/api/timetable/professor/:id",
                    "/api/timetable/room/:id"
                ],
                "availability": ["/api/professors/:id/availability", "/api/rooms/:id/availability"],
                "catalog": [
                    "/api/departments",
                    "/api/grades",
                    "/api/sections",
                    "/api/subjects",
                    "/api/professors",
                    "/api/rooms"
                ]
            }
        }
    }))
}

/// GET /health - 503 when the store cannot be reached
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "status": "ok", "store": state.store.backend() } })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": true, "message": "Store unavailable", "code": "SERVICE_UNAVAILABLE" })),
            )
        }
    }
}
