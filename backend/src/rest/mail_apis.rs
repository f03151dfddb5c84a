//! # REST API for the Notification Inbox

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::rest::error_response;
use crate::AppState;
use shared::{MailFilter, MailListResponse};

/// Create the mail API router
pub fn router() -> Router<AppState> {
    Router::new().route("/mail", get(inbox))
}

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    /// `recent`, `last-week`, or `important`; defaults to `recent`
    filter: Option<String>,
}

/// The filtered inbox, newest first
pub async fn inbox(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<MailListResponse>, (StatusCode, Json<Value>)> {
    info!("GET /api/mail - filter: {:?}", query.filter);

    let filter = match query.filter.as_deref() {
        None => MailFilter::default(),
        Some(raw) => raw.parse::<MailFilter>().map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "code": "INVALID_INPUT",
                })),
            )
        })?,
    };

    match state.mail_service.inbox(filter).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to read inbox: {}", e);
            Err(error_response(&e))
        }
    }
}
