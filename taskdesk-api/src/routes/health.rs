/// Health check endpoint
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{app::AppState, error::ApiResult};

/// `GET /health`
///
/// Verifies database connectivity with a trivial query so a green check
/// means the service can actually serve requests.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| crate::error::ApiError::Internal(format!("Health check failed: {}", e)))?;

    Ok(Json(json!({
        "status": "ok",
        "version": taskdesk_shared::VERSION,
    })))
}
