use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::activity_service::ActivityService;
use crate::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::domain::pet_service::require_pet;
use crate::domain::session::Session;
use crate::storage::{DocumentStore, DocumentStoreExt, KeyLocks, RecordKey};
use shared::{AddTaskRequest, Task, TaskListResponse, TaskResponse};

pub(crate) type TaskMap = BTreeMap<String, Task>;

/// The five tasks every new pet starts with
const DEFAULT_TASK_SLUGS: [&str; 5] = ["lunch", "walk", "treat", "bath", "park"];

fn default_task_text(slug: &str, pet_name: &str) -> String {
    match slug {
        "lunch" => format!("Give {} lunch", pet_name),
        "walk" => format!("Take {} on a walk", pet_name),
        "treat" => format!("Give {} a treat", pet_name),
        "bath" => format!("Give {} a bath", pet_name),
        _ => format!("Take {} to the park!", pet_name),
    }
}

/// Service for a pet's daily task checklist
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn DocumentStore>,
    locks: KeyLocks,
    session: Session,
    activity: ActivityService,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        locks: KeyLocks,
        session: Session,
        activity: ActivityService,
    ) -> Self {
        Self {
            store,
            locks,
            session,
            activity,
        }
    }

    fn tasks_key(&self, pet_id: &str) -> RecordKey {
        RecordKey::tasks(self.session.user_id(), pet_id)
    }

    /// Give a pet with no tasks at all its five defaults. A pet that has any
    /// task, completed or not, is never reseeded.
    pub async fn seed_defaults(&self, pet_id: &str) -> DomainResult<TaskListResponse> {
        let pet = require_pet(self.store.as_ref(), &self.session, pet_id).await?;

        let key = self.tasks_key(pet_id);
        let _guard = self.locks.acquire(&key.lock_key()).await;
        let mut tasks: TaskMap = self.store.read_or_default(&key).await?;

        if tasks.is_empty() {
            info!("Seeding default tasks for pet {}", pet_id);

            let now = Utc::now().timestamp_millis() as u64;
            for (offset, slug) in DEFAULT_TASK_SLUGS.iter().enumerate() {
                let task = Task {
                    id: Task::seeded_id(slug),
                    text: default_task_text(slug, &pet.name),
                    completed: false,
                    // Stagger the stamps so the seeded order is the display order
                    created_at: now + offset as u64,
                };
                tasks.insert(task.id.clone(), task);
            }

            self.store.write(&key, &tasks).await?;
        }

        Ok(TaskListResponse {
            tasks: in_insertion_order(tasks),
        })
    }

    /// Add a task the owner typed in
    pub async fn add_task(&self, pet_id: &str, request: AddTaskRequest) -> DomainResult<TaskResponse> {
        let text = request.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText.into());
        }

        require_pet(self.store.as_ref(), &self.session, pet_id).await?;

        let key = self.tasks_key(pet_id);
        let _guard = self.locks.acquire(&key.lock_key()).await;
        let mut tasks: TaskMap = self.store.read_or_default(&key).await?;

        let stamp = unused_stamp(&tasks, Utc::now().timestamp_millis() as u64);
        let task = Task {
            id: Task::generate_id(stamp),
            text,
            completed: false,
            created_at: stamp,
        };
        tasks.insert(task.id.clone(), task.clone());
        self.store.write(&key, &tasks).await?;

        info!("Added task {} for pet {}", task.id, pet_id);

        Ok(TaskResponse {
            task,
            success_message: "Task added successfully".to_string(),
        })
    }

    /// Mark a task done and log it to the pet's recent activity. Completing
    /// an already-completed task changes nothing and logs nothing.
    pub async fn complete_task(&self, pet_id: &str, task_id: &str) -> DomainResult<TaskResponse> {
        let key = self.tasks_key(pet_id);

        let completed = {
            let _guard = self.locks.acquire(&key.lock_key()).await;
            let mut tasks: TaskMap = self.store.read_or_default(&key).await?;

            let task = tasks
                .get_mut(task_id)
                .ok_or_else(|| DomainError::not_found("Task", task_id))?;

            if task.completed {
                info!("Task {} already completed, nothing to do", task_id);
                return Ok(TaskResponse {
                    task: task.clone(),
                    success_message: "Task already completed".to_string(),
                });
            }

            task.completed = true;
            let snapshot = task.clone();
            self.store.write(&key, &tasks).await?;
            snapshot
        };

        // Logged outside the pet lock; the activity write takes it again
        self.activity.record(pet_id, &completed.text).await?;

        info!("Completed task {} for pet {}", task_id, pet_id);

        Ok(TaskResponse {
            task: completed,
            success_message: "Task completed".to_string(),
        })
    }

    /// All of a pet's tasks in insertion order
    pub async fn list_tasks(&self, pet_id: &str) -> DomainResult<TaskListResponse> {
        let tasks: TaskMap = self.store.read_or_default(&self.tasks_key(pet_id)).await?;

        Ok(TaskListResponse {
            tasks: in_insertion_order(tasks),
        })
    }

    /// The checklist the dashboard shows: not-yet-completed tasks in
    /// insertion order
    pub async fn active_tasks(&self, pet_id: &str) -> DomainResult<TaskListResponse> {
        let tasks: TaskMap = self.store.read_or_default(&self.tasks_key(pet_id)).await?;

        let mut tasks: Vec<Task> = tasks.into_values().filter(|t| !t.completed).collect();
        sort_for_display(&mut tasks);

        Ok(TaskListResponse { tasks })
    }
}

fn in_insertion_order(tasks: TaskMap) -> Vec<Task> {
    let mut tasks: Vec<Task> = tasks.into_values().collect();
    sort_for_display(&mut tasks);
    tasks
}

fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// First stamp at or after `stamp` whose task ID is free. Tasks added within
/// the same millisecond get consecutive stamps, which also keeps their
/// insertion order.
fn unused_stamp(existing: &TaskMap, mut stamp: u64) -> u64 {
    while existing.contains_key(&Task::generate_id(stamp)) {
        stamp += 1;
    }
    stamp
}
