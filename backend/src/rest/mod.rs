//! # REST API
//!
//! One module per resource. Every router is merged and mounted under
//! `/api` by `create_router`, and every endpoint shares the same error
//! shape: a JSON body with `error` (human text) and `code` (stable
//! machine tag).

pub mod activity_apis;
pub mod appointment_apis;
pub mod dashboard_apis;
pub mod mail_apis;
pub mod pet_apis;
pub mod task_apis;

use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use crate::domain::DomainError;

/// Map a domain error onto the shared wire shape
pub(crate) fn error_response(error: &DomainError) -> (StatusCode, Json<Value>) {
    let (status, code) = match error {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
    };

    let body = serde_json::json!({
        "error": error.to_string(),
        "code": code,
    });

    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn test_error_codes_by_variant() {
        let (status, body) = error_response(&ValidationError::EmptyPetName.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["code"], "INVALID_INPUT");

        let (status, body) = error_response(&DomainError::not_found("Pet", "pet::nope"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["code"], "NOT_FOUND");
        assert!(body.0["error"].as_str().unwrap().contains("pet::nope"));
    }
}
