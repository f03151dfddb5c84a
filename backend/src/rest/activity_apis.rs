//! # REST API for the Recent Activity Feed

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::{error, info};

use crate::rest::error_response;
use crate::AppState;
use shared::ActivityListResponse;

/// Create the activity API router
pub fn router() -> Router<AppState> {
    Router::new().route("/pets/:pet_id/activity", get(recent_activity))
}

/// A pet's recent activity, newest first, at most five entries
pub async fn recent_activity(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<ActivityListResponse>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/{}/activity", pet_id);

    match state.activity_service.recent(&pet_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to list activity: {}", e);
            Err(error_response(&e))
        }
    }
}
