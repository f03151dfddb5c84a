//! # REST API for Appointment Scheduling

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
use shared::{AddAppointmentRequest, AppointmentListResponse, AppointmentResponse};

/// Create the appointment API router
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/pets/:pet_id/appointments",
        get(list_appointments).post(add_appointment),
    )
}

/// A pet's appointments, soonest first
pub async fn list_appointments(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<AppointmentListResponse>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/{}/appointments", pet_id);

    match state.appointment_service.list_appointments(&pet_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to list appointments: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Schedule an appointment
pub async fn add_appointment(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    Json(request): Json<AddAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), (StatusCode, Json<Value>)> {
    info!(
        "POST /api/pets/{}/appointments - title: {:?}",
        pet_id, request.title
    );

    match state
        .appointment_service
        .add_appointment(&pet_id, request)
        .await
    {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(e) => {
            error!("Failed to add appointment: {}", e);
            Err(error_response(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Session;
    use crate::storage::RemoteStore;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use shared::CreatePetRequest;
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    async fn setup_test_app() -> (Router, String) {
        let state = AppState::new(Arc::new(RemoteStore::new()), Session::new("user::test"));

        let pet_id = state
            .pet_service
            .create_pet(CreatePetRequest {
                name: "Rex".to_string(),
                species: "Dog".to_string(),
                breed: "Corgi".to_string(),
                birthday: None,
                image: None,
            })
            .await
            .unwrap()
            .pet
            .id;

        (router().with_state(state), pet_id)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_add_appointments_listed_soonest_first() {
        let (app, pet_id) = setup_test_app().await;
        let uri = format!("/pets/{}/appointments", pet_id);

        for (title, date, time) in [
            ("Grooming", "2026-12-24", "09:00"),
            ("Vet checkup", "2026-09-01", "14:30"),
        ] {
            let response = app
                .clone()
                .oneshot(post_json(
                    &uri,
                    json!({ "title": title, "date": date, "time": time }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listed = body_json(response).await;
        let titles: Vec<&str> = listed["appointments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Vet checkup", "Grooming"]);
    }

    #[tokio::test]
    async fn test_add_appointment_requires_all_fields() {
        let (app, pet_id) = setup_test_app().await;
        let uri = format!("/pets/{}/appointments", pet_id);

        for (body, message) in [
            (
                json!({ "title": " ", "date": "2026-09-01", "time": "14:30" }),
                "Appointment title cannot be empty",
            ),
            (
                json!({ "title": "Vet", "date": "", "time": "14:30" }),
                "Appointment date is required",
            ),
            (
                json!({ "title": "Vet", "date": "2026-09-01", "time": "" }),
                "Appointment time is required",
            ),
        ] {
            let response = app.clone().oneshot(post_json(&uri, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let error = body_json(response).await;
            assert_eq!(error["code"], "INVALID_INPUT");
            assert_eq!(error["error"], message);
        }
    }

    #[tokio::test]
    async fn test_add_appointment_for_unknown_pet_is_not_found() {
        let (app, _) = setup_test_app().await;

        let response = app
            .oneshot(post_json(
                "/pets/pet::nope/appointments",
                json!({ "title": "Vet", "date": "2026-09-01", "time": "14:30" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
