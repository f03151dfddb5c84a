//! # PawPal Backend
//!
//! All non-UI logic for the pet-care tracker: pet registration, the daily
//! task checklist, appointment scheduling, the recent-activity feed, and
//! the notification inbox, served over a REST API.
//!
//! ## Architecture
//!
//! The backend is layered; each layer only calls downward:
//!
//! ```text
//! REST Layer (axum handlers)
//!     ↓
//! Presenter Layer (dashboard assembly, live refresh)
//!     ↓
//! Domain Layer (services, validation, business rules)
//!     ↓
//! Storage Layer (document store: local files or remote with push)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Pick and initialize the configured document store
//! - Wire every service to one shared store, lock set, and session
//! - Expose the REST router with CORS for a local frontend

pub mod config;
pub mod domain;
pub mod presenter;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::{AppConfig, StoreMode};
use crate::domain::{
    ActivityService, AppointmentService, MailService, PetService, Session, TaskService,
};
use crate::presenter::DashboardServices;
use crate::storage::{DocumentStore, KeyLocks, LocalStore, RemoteStore};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub session: Session,
    pub pet_service: PetService,
    pub task_service: TaskService,
    pub appointment_service: AppointmentService,
    pub activity_service: ActivityService,
    pub mail_service: MailService,
}

impl AppState {
    /// Wire every service to one shared store and session
    pub fn new(store: Arc<dyn DocumentStore>, session: Session) -> Self {
        let locks = KeyLocks::new();

        let activity_service =
            ActivityService::new(store.clone(), locks.clone(), session.clone());
        let task_service = TaskService::new(
            store.clone(),
            locks.clone(),
            session.clone(),
            activity_service.clone(),
        );
        let appointment_service =
            AppointmentService::new(store.clone(), locks.clone(), session.clone());
        let pet_service = PetService::new(store.clone(), locks.clone(), session.clone());
        let mail_service = MailService::new(store.clone(), locks, session.clone());

        AppState {
            store,
            session,
            pet_service,
            task_service,
            appointment_service,
            activity_service,
            mail_service,
        }
    }

    /// The service bundle a dashboard presenter drives
    pub fn dashboard_services(&self) -> DashboardServices {
        DashboardServices {
            pets: self.pet_service.clone(),
            tasks: self.task_service.clone(),
            appointments: self.appointment_service.clone(),
            activity: self.activity_service.clone(),
        }
    }
}

/// Initialize the backend with the configured store and session
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let session = match &config.user_id {
        Some(user_id) => Session::new(user_id.clone()),
        None => {
            let session = Session::anonymous();
            info!("No PAWPAL_USER configured, running as {}", session.user_id());
            session
        }
    };

    let store: Arc<dyn DocumentStore> = match config.store_mode {
        StoreMode::Local => {
            info!("Using local store at {}", config.data_directory.display());
            Arc::new(LocalStore::new(&config.data_directory)?)
        }
        StoreMode::Remote => {
            info!("Using remote store with live subscriptions");
            Arc::new(RemoteStore::new())
        }
    };

    Ok(AppState::new(store, session))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .merge(rest::pet_apis::router())
        .merge(rest::task_apis::router())
        .merge(rest::appointment_apis::router())
        .merge(rest::activity_apis::router())
        .merge(rest::dashboard_apis::router())
        .merge(rest::mail_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
