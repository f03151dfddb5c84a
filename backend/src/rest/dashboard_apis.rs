//! # REST API for the Dashboard
//!
//! Opening a dashboard resolves the pet the same way the page did: an
//! explicit pet ID wins, otherwise the remembered active pet. When neither
//! resolves the response is a `303 See Other` pointing at pet selection.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::{error, info};

use crate::presenter::{DashboardNavigation, DashboardPresenter};
use crate::rest::error_response;
use crate::AppState;
use shared::DashboardView;

/// Create the dashboard API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(active_dashboard))
        .route("/pets/:pet_id/dashboard", get(pet_dashboard))
}

/// Dashboard for an explicit pet
pub async fn pet_dashboard(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<DashboardView>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/{}/dashboard", pet_id);
    open_dashboard(&state, Some(&pet_id)).await
}

/// Dashboard for the remembered active pet
pub async fn active_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, (StatusCode, Json<Value>)> {
    info!("GET /api/dashboard");
    open_dashboard(&state, None).await
}

async fn open_dashboard(
    state: &AppState,
    pet_query: Option<&str>,
) -> Result<Json<DashboardView>, (StatusCode, Json<Value>)> {
    let navigation = DashboardPresenter::open(
        state.store.clone(),
        state.session.clone(),
        state.dashboard_services(),
        pet_query,
    )
    .await
    .map_err(|e| {
        error!("Failed to open dashboard: {}", e);
        error_response(&e)
    })?;

    match navigation {
        DashboardNavigation::Dashboard(presenter) => {
            // One-shot request: take the snapshot, dropping the presenter
            // cancels its subscriptions
            let view = presenter.view().await;
            Ok(Json(view))
        }
        DashboardNavigation::RedirectToSelection => Err((
            StatusCode::SEE_OTHER,
            Json(serde_json::json!({
                "redirect": "/api/pets/selection",
                "code": "PET_NOT_RESOLVED",
            })),
        )),
    }
}
