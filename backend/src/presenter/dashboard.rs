//! The live dashboard. Opening it resolves which pet to show, seeds the
//! default checklist on a pet's first visit, and keeps a ready-to-render
//! view current. On a store with push support the presenter subscribes to
//! the pet's records and rebuilds the view whenever one changes; callers
//! follow along through a revision counter instead of polling.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{
    ActivityService, AppointmentService, DomainError, DomainResult, PetService, Session,
    TaskService,
};
use crate::presenter::views;
use crate::storage::{DocumentStore, RecordKey, RecordWatch, WatchEvent};
use shared::{
    AddAppointmentRequest, AddTaskRequest, AppointmentResponse, DashboardView, TaskResponse,
};

/// Shown when the push stream ended and the data on screen can go stale
const CONNECTION_LOST_NOTICE: &str =
    "Live updates are unavailable. Shown data may be out of date.";

/// Shown when pushes were dropped; the view has been reloaded from the store
const UPDATES_MISSED_NOTICE: &str = "Some live updates were missed. The view has been reloaded.";

/// Where opening the dashboard lands
pub enum DashboardNavigation {
    /// The pet resolved and a presenter is running
    Dashboard(DashboardPresenter),
    /// No explicit pet and no usable active pet; show pet selection instead
    RedirectToSelection,
}

/// The services a dashboard drives, bundled so callers hand over one value
#[derive(Clone)]
pub struct DashboardServices {
    pub pets: PetService,
    pub tasks: TaskService,
    pub appointments: AppointmentService,
    pub activity: ActivityService,
}

/// One open dashboard for one pet
pub struct DashboardPresenter {
    pet_id: String,
    services: DashboardServices,
    view: Arc<RwLock<DashboardView>>,
    revision_tx: watch::Sender<u64>,
    revision_rx: watch::Receiver<u64>,
    watch_task: Option<JoinHandle<()>>,
}

impl DashboardPresenter {
    /// Resolve the pet and start presenting it. An explicit `pet_query` must
    /// name a known pet; without one the remembered active pet is used. If
    /// neither resolves the caller gets the redirect outcome.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        session: Session,
        services: DashboardServices,
        pet_query: Option<&str>,
    ) -> DomainResult<DashboardNavigation> {
        let resolved = match pet_query {
            Some(pet_id) => services.pets.get_pet(pet_id).await?,
            None => services.pets.active_pet().await?.active_pet,
        };

        let Some(pet) = resolved else {
            info!(
                "Dashboard could not resolve a pet (query: {:?}), redirecting to selection",
                pet_query
            );
            return Ok(DashboardNavigation::RedirectToSelection);
        };

        // First visit gives the pet its default checklist
        services.tasks.seed_defaults(&pet.id).await?;

        let initial = build_current_view(&services, &pet.id).await?;
        let view = Arc::new(RwLock::new(initial));
        let (revision_tx, revision_rx) = watch::channel(0u64);

        let watch_task =
            spawn_watch_loop(store.as_ref(), &session, &services, &pet.id, &view, &revision_tx);

        info!(
            "Dashboard open for pet {} (live updates: {})",
            pet.id,
            watch_task.is_some()
        );

        Ok(DashboardNavigation::Dashboard(DashboardPresenter {
            pet_id: pet.id,
            services,
            view,
            revision_tx,
            revision_rx,
            watch_task,
        }))
    }

    pub fn pet_id(&self) -> &str {
        &self.pet_id
    }

    /// Snapshot of the current view
    pub async fn view(&self) -> DashboardView {
        self.view.read().await.clone()
    }

    /// A receiver that is notified every time the view is rebuilt
    pub fn revisions(&self) -> watch::Receiver<u64> {
        self.revision_rx.clone()
    }

    /// Add a task for the presented pet and refresh the view
    pub async fn add_task(&self, request: AddTaskRequest) -> DomainResult<TaskResponse> {
        let response = self.services.tasks.add_task(&self.pet_id, request).await?;
        self.refresh_after_mutation().await?;
        Ok(response)
    }

    /// Complete a task for the presented pet and refresh the view
    pub async fn complete_task(&self, task_id: &str) -> DomainResult<TaskResponse> {
        let response = self
            .services
            .tasks
            .complete_task(&self.pet_id, task_id)
            .await?;
        self.refresh_after_mutation().await?;
        Ok(response)
    }

    /// Schedule an appointment for the presented pet and refresh the view
    pub async fn add_appointment(
        &self,
        request: AddAppointmentRequest,
    ) -> DomainResult<AppointmentResponse> {
        let response = self
            .services
            .appointments
            .add_appointment(&self.pet_id, request)
            .await?;
        self.refresh_after_mutation().await?;
        Ok(response)
    }

    async fn refresh_after_mutation(&self) -> DomainResult<()> {
        refresh(&self.services, &self.pet_id, &self.view).await?;
        self.revision_tx.send_modify(|revision| *revision += 1);
        Ok(())
    }

    /// Stop following store pushes. Also happens on drop.
    pub fn close(&mut self) {
        if let Some(task) = self.watch_task.take() {
            task.abort();
        }
    }
}

impl Drop for DashboardPresenter {
    fn drop(&mut self) {
        self.close();
    }
}

/// Subscribe to the pet's three records and rebuild the view on every push.
/// Returns `None` when the store has no push support; the view then only
/// refreshes after local mutations.
fn spawn_watch_loop(
    store: &dyn DocumentStore,
    session: &Session,
    services: &DashboardServices,
    pet_id: &str,
    view: &Arc<RwLock<DashboardView>>,
    revision_tx: &watch::Sender<u64>,
) -> Option<JoinHandle<()>> {
    let user_id = session.user_id();
    let tasks = store.watch(&RecordKey::tasks(user_id, pet_id))?;
    let appointments = store.watch(&RecordKey::appointments(user_id, pet_id))?;
    let activity = store.watch(&RecordKey::activity(user_id, pet_id))?;

    let services = services.clone();
    let pet_id = pet_id.to_string();
    let view = view.clone();
    let revision_tx = revision_tx.clone();

    Some(tokio::spawn(async move {
        watch_loop(
            [tasks, appointments, activity],
            services,
            pet_id,
            view,
            revision_tx,
        )
        .await;
    }))
}

async fn watch_loop(
    watches: [RecordWatch; 3],
    services: DashboardServices,
    pet_id: String,
    view: Arc<RwLock<DashboardView>>,
    revision_tx: watch::Sender<u64>,
) {
    let [mut tasks, mut appointments, mut activity] = watches;

    loop {
        let event = tokio::select! {
            event = tasks.next_event() => event,
            event = appointments.next_event() => event,
            event = activity.next_event() => event,
        };

        match event {
            WatchEvent::Changed(_) => {
                // Every event rebuilds all three sections, so a push lost to
                // a concurrent arm is repaired by this refresh
                if let Err(err) = refresh(&services, &pet_id, &view).await {
                    error!("Dashboard refresh after push failed: {}", err);
                }
            }
            WatchEvent::Lagged(skipped) => {
                warn!("Dashboard for pet {} missed {} pushes", pet_id, skipped);
                set_notice(&view, UPDATES_MISSED_NOTICE).await;
                if let Err(err) = refresh(&services, &pet_id, &view).await {
                    error!("Dashboard reload after missed pushes failed: {}", err);
                }
            }
            WatchEvent::Closed => {
                warn!("Dashboard for pet {} lost its push stream", pet_id);
                set_notice(&view, CONNECTION_LOST_NOTICE).await;
                revision_tx.send_modify(|revision| *revision += 1);
                break;
            }
        }

        revision_tx.send_modify(|revision| *revision += 1);
    }
}

async fn build_current_view(
    services: &DashboardServices,
    pet_id: &str,
) -> DomainResult<DashboardView> {
    let pet = services
        .pets
        .get_pet(pet_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Pet", pet_id))?;
    let tasks = services.tasks.list_tasks(pet_id).await?.tasks;
    let appointments = services
        .appointments
        .list_appointments(pet_id)
        .await?
        .appointments;
    let activity = services.activity.recent(pet_id).await?.entries;

    Ok(views::build_dashboard(
        &pet,
        &tasks,
        &appointments,
        &activity,
        Utc::now().date_naive(),
    ))
}

/// Rebuild the view from the store, keeping any connection notice that is
/// already showing
async fn refresh(
    services: &DashboardServices,
    pet_id: &str,
    view: &Arc<RwLock<DashboardView>>,
) -> DomainResult<()> {
    let mut next = build_current_view(services, pet_id).await?;

    let mut guard = view.write().await;
    next.connection_notice = guard.connection_notice.clone();
    *guard = next;

    Ok(())
}

async fn set_notice(view: &Arc<RwLock<DashboardView>>, notice: &str) {
    view.write().await.connection_notice = Some(notice.to_string());
}
