//! # REST API for Pet Management
//!
//! Endpoints for registering pets, listing them, the selection screen,
//! and the remembered active pet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

use crate::domain::DomainError;
use crate::presenter::build_pet_selection;
use crate::rest::error_response;
use crate::AppState;
use shared::{
    ActivePetResponse, CreatePetRequest, Pet, PetListResponse, PetResponse, PetSelectionView,
    SetActivePetRequest, SetActivePetResponse,
};

/// Create the pet API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/selection", get(pet_selection))
        .route("/pets/active", get(active_pet).put(set_active_pet))
        .route("/pets/:pet_id", get(get_pet))
}

/// Register a new pet
pub async fn create_pet(
    State(state): State<AppState>,
    Json(request): Json<CreatePetRequest>,
) -> Result<(StatusCode, Json<PetResponse>), (StatusCode, Json<Value>)> {
    info!("POST /api/pets - name: {:?}", request.name);

    match state.pet_service.create_pet(request).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(e) => {
            error!("Failed to create pet: {}", e);
            Err(error_response(&e))
        }
    }
}

/// List all registered pets
pub async fn list_pets(
    State(state): State<AppState>,
) -> Result<Json<PetListResponse>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets");

    match state.pet_service.list_pets().await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to list pets: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Get a pet by ID
pub async fn get_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<Pet>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/{}", pet_id);

    match state.pet_service.get_pet(&pet_id).await {
        Ok(Some(pet)) => Ok(Json(pet)),
        Ok(None) => Err(error_response(&DomainError::not_found("Pet", pet_id))),
        Err(e) => {
            error!("Failed to get pet: {}", e);
            Err(error_response(&e))
        }
    }
}

/// The pet selection screen, cards in registration order
pub async fn pet_selection(
    State(state): State<AppState>,
) -> Result<Json<PetSelectionView>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/selection");

    match state.pet_service.list_pets().await {
        Ok(response) => Ok(Json(build_pet_selection(
            &response.pets,
            Utc::now().date_naive(),
        ))),
        Err(e) => {
            error!("Failed to build pet selection: {}", e);
            Err(error_response(&e))
        }
    }
}

/// The remembered active pet, if any
pub async fn active_pet(
    State(state): State<AppState>,
) -> Result<Json<ActivePetResponse>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/active");

    match state.pet_service.active_pet().await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to get active pet: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Remember the pet the owner just opened
pub async fn set_active_pet(
    State(state): State<AppState>,
    Json(request): Json<SetActivePetRequest>,
) -> Result<Json<SetActivePetResponse>, (StatusCode, Json<Value>)> {
    info!("PUT /api/pets/active - pet: {}", request.pet_id);

    match state.pet_service.set_active_pet(&request.pet_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to set active pet: {}", e);
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
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    fn setup_test_app() -> Router {
        let state = AppState::new(Arc::new(RemoteStore::new()), Session::new("user::test"));
        router().with_state(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_pet() {
        let app = setup_test_app();

        let request = post_json(
            "/pets",
            json!({
                "name": "Rex",
                "species": "Dog",
                "breed": "Corgi",
                "birthday": "2023-08-23",
                "image": null
            }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["pet"]["name"], "Rex");
        let pet_id = created["pet"]["id"].as_str().unwrap().to_string();

        let response = app.oneshot(get(&format!("/pets/{}", pet_id))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], pet_id.as_str());
    }

    #[tokio::test]
    async fn test_create_pet_with_blank_name_rejected() {
        let app = setup_test_app();

        let request = post_json(
            "/pets",
            json!({
                "name": "   ",
                "species": "Dog",
                "breed": "",
                "birthday": null,
                "image": null
            }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        assert_eq!(error["code"], "INVALID_INPUT");
        assert_eq!(error["error"], "Pet name cannot be empty");
    }

    #[tokio::test]
    async fn test_get_unknown_pet_is_not_found() {
        let app = setup_test_app();

        let response = app.oneshot(get("/pets/pet::nope")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_pet_selection_uses_placeholder_image() {
        let app = setup_test_app();

        let request = post_json(
            "/pets",
            json!({
                "name": "Maple",
                "species": "Cat",
                "breed": "",
                "birthday": null,
                "image": null
            }),
        );
        app.clone().oneshot(request).await.unwrap();

        let response = app.oneshot(get("/pets/selection")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view = body_json(response).await;
        assert_eq!(view["cards"].as_array().unwrap().len(), 1);
        assert_eq!(view["cards"][0]["name"], "Maple");
        assert_eq!(view["cards"][0]["breed_label"], "Cat");
        assert_eq!(
            view["cards"][0]["image_url"],
            crate::presenter::PLACEHOLDER_PET_IMAGE
        );
    }

    #[tokio::test]
    async fn test_active_pet_round_trip() {
        let app = setup_test_app();

        // Nothing remembered yet
        let response = app.clone().oneshot(get("/pets/active")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["active_pet"].is_null());

        let created = body_json(
            app.clone()
                .oneshot(post_json(
                    "/pets",
                    json!({
                        "name": "Rex",
                        "species": "Dog",
                        "breed": "Corgi",
                        "birthday": null,
                        "image": null
                    }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let pet_id = created["pet"]["id"].as_str().unwrap();

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/pets/active")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "pet_id": pet_id }).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/pets/active")).await.unwrap();
        assert_eq!(body_json(response).await["active_pet"]["id"], pet_id);
    }

    #[tokio::test]
    async fn test_set_active_pet_requires_existing_pet() {
        let app = setup_test_app();

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/pets/active")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "pet_id": "pet::nope" }).to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
