use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState, HealthResponse};

/// GET /
pub async fn index() -> Json<&'static str> {
    Json("Welcome!")
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Store ping failed: {e:#}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}
