//! # REST API for the Daily Task Checklist

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tracing::{error, info};

use crate::rest::error_response;
use crate::AppState;
use shared::{AddTaskRequest, TaskListResponse, TaskResponse};

/// Create the task API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pets/:pet_id/tasks", get(list_tasks).post(add_task))
        .route("/pets/:pet_id/tasks/:task_id/complete", post(complete_task))
}

/// All of a pet's tasks in insertion order
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> Result<Json<TaskListResponse>, (StatusCode, Json<Value>)> {
    info!("GET /api/pets/{}/tasks", pet_id);

    match state.task_service.list_tasks(&pet_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to list tasks: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Add a task the owner typed in
pub async fn add_task(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    Json(request): Json<AddTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), (StatusCode, Json<Value>)> {
    info!("POST /api/pets/{}/tasks - text: {:?}", pet_id, request.text);

    match state.task_service.add_task(&pet_id, request).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(e) => {
            error!("Failed to add task: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Mark a task done
pub async fn complete_task(
    State(state): State<AppState>,
    Path((pet_id, task_id)): Path<(String, String)>,
) -> Result<Json<TaskResponse>, (StatusCode, Json<Value>)> {
    info!("POST /api/pets/{}/tasks/{}/complete", pet_id, task_id);

    match state.task_service.complete_task(&pet_id, &task_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to complete task: {}", e);
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
    async fn test_add_and_list_tasks() {
        let (app, pet_id) = setup_test_app().await;

        let request = post_json(
            &format!("/pets/{}/tasks", pet_id),
            json!({ "text": "Brush Rex" }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let added = body_json(response).await;
        assert_eq!(added["task"]["text"], "Brush Rex");
        assert_eq!(added["task"]["completed"], false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/pets/{}/tasks", pet_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listed = body_json(response).await;
        assert_eq!(listed["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(listed["tasks"][0]["id"], added["task"]["id"]);
    }

    #[tokio::test]
    async fn test_add_task_with_blank_text_rejected() {
        let (app, pet_id) = setup_test_app().await;

        let request = post_json(&format!("/pets/{}/tasks", pet_id), json!({ "text": "  " }));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        assert_eq!(error["code"], "INVALID_INPUT");
        assert_eq!(error["error"], "Task text cannot be empty");
    }

    #[tokio::test]
    async fn test_add_task_for_unknown_pet_is_not_found() {
        let (app, _) = setup_test_app().await;

        let request = post_json("/pets/pet::nope/tasks", json!({ "text": "Brush" }));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_complete_task() {
        let (app, pet_id) = setup_test_app().await;

        let added = body_json(
            app.clone()
                .oneshot(post_json(
                    &format!("/pets/{}/tasks", pet_id),
                    json!({ "text": "Brush Rex" }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let task_id = added["task"]["id"].as_str().unwrap();

        let uri = format!("/pets/{}/tasks/{}/complete", pet_id, task_id);
        let response = app
            .clone()
            .oneshot(post_json(&uri, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let completed = body_json(response).await;
        assert_eq!(completed["task"]["completed"], true);
        assert_eq!(completed["success_message"], "Task completed");

        // Completing again changes nothing
        let response = app.oneshot(post_json(&uri, json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["success_message"],
            "Task already completed"
        );
    }

    #[tokio::test]
    async fn test_complete_unknown_task_is_not_found() {
        let (app, pet_id) = setup_test_app().await;

        let uri = format!("/pets/{}/tasks/task::nope/complete", pet_id);
        let response = app.oneshot(post_json(&uri, json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
