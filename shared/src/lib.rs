use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Pet ID in format: "pet::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    /// Free-form species label ("Dog", "Cat", ...), may be empty
    pub species: String,
    /// Free-form breed label, may be empty
    pub breed: String,
    /// ISO 8601 date (YYYY-MM-DD), absent when the owner never entered one
    pub birthday: Option<String>,
    /// Profile picture: an external URL or a data URL built from uploaded bytes
    pub image_url: Option<String>,
    /// When the pet was registered (RFC 3339)
    pub date_added: String,
}

impl Pet {
    /// Generate a pet ID from a fresh UUID
    pub fn generate_id() -> String {
        format!("pet::{}", Uuid::new_v4())
    }
}

/// Daily task ID in format: "task::<slug>" for seeded tasks or
/// "task::epoch_millis" for tasks the owner added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Insertion stamp (epoch millis); tasks render in this order
    pub created_at: u64,
}

impl Task {
    /// Generate a task ID from a timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("task::{}", epoch_millis)
    }

    /// ID of one of the seeded default tasks
    pub fn seeded_id(slug: &str) -> String {
        format!("task::{}", slug)
    }
}

/// Appointment ID in format: "appt::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub title: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date: String,
    /// Wall-clock time (HH:MM)
    pub time: String,
    /// Epoch millis derived from date + time; the sort key for every listing
    pub timestamp: i64,
}

impl Appointment {
    /// Generate an appointment ID from a timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("appt::{}", epoch_millis)
    }
}

/// Activity entry ID in format: "activity::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    /// Text of the completed task this entry records
    pub text: String,
    /// When the completion happened (RFC 3339)
    pub recorded_at: String,
}

impl ActivityEntry {
    /// Generate an activity entry ID from a timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("activity::{}", epoch_millis)
    }

    /// Parse an activity entry ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, RecordIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "activity" {
            return Err(RecordIdError::InvalidFormat);
        }

        parts[1].parse::<u64>().map_err(|_| RecordIdError::InvalidTimestamp)
    }

    /// Extract the timestamp from this entry's ID for sorting
    pub fn extract_timestamp(&self) -> Result<u64, RecordIdError> {
        Self::parse_id(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for RecordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIdError::InvalidFormat => write!(f, "Invalid record ID format"),
            RecordIdError::InvalidTimestamp => write!(f, "Invalid timestamp in record ID"),
        }
    }
}

impl std::error::Error for RecordIdError {}

/// Mail message ID in format: "mail::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub content: String,
    /// When the message arrived (RFC 3339); inbox listings sort by this
    pub timestamp: String,
    pub is_important: bool,
    pub is_read: bool,
}

impl MailMessage {
    /// Generate a mail message ID from a timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("mail::{}", epoch_millis)
    }
}

/// Inbox filter selected by the mail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MailFilter {
    /// Everything, newest first
    #[default]
    Recent,
    /// Messages newer than seven days
    LastWeek,
    /// Messages flagged important
    Important,
}

impl fmt::Display for MailFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailFilter::Recent => write!(f, "recent"),
            MailFilter::LastWeek => write!(f, "last-week"),
            MailFilter::Important => write!(f, "important"),
        }
    }
}

impl std::str::FromStr for MailFilter {
    type Err = ParseMailFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(MailFilter::Recent),
            "last-week" => Ok(MailFilter::LastWeek),
            "important" => Ok(MailFilter::Important),
            other => Err(ParseMailFilterError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseMailFilterError(pub String);

impl fmt::Display for ParseMailFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown mail filter: {}", self.0)
    }
}

impl std::error::Error for ParseMailFilterError {}

/// Image supplied when registering a pet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PetImageSource {
    /// Link to an image hosted elsewhere
    Url { url: String },
    /// Raw image bytes uploaded from the device
    Upload { content_type: String, data: Vec<u8> },
}

/// Request for registering a new pet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePetRequest {
    pub name: String,
    pub species: String,
    pub breed: String,
    /// ISO 8601 date (YYYY-MM-DD), optional
    pub birthday: Option<String>,
    pub image: Option<PetImageSource>,
}

/// Response after registering a pet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetResponse {
    pub pet: Pet,
    pub success_message: String,
}

/// Response containing all registered pets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetListResponse {
    pub pets: Vec<Pet>,
}

/// Request for remembering the last pet the owner opened
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetActivePetRequest {
    pub pet_id: String,
}

/// Response after setting the active pet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetActivePetResponse {
    pub success_message: String,
    pub active_pet: Pet,
}

/// Response containing the remembered active pet, if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivePetResponse {
    pub active_pet: Option<Pet>,
}

/// Request for adding a daily task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddTaskRequest {
    pub text: String,
}

/// Response after adding or completing a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResponse {
    pub task: Task,
    pub success_message: String,
}

/// Response containing a pet's tasks in insertion order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Request for scheduling an appointment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddAppointmentRequest {
    pub title: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date: String,
    /// Wall-clock time (HH:MM)
    pub time: String,
}

/// Response after scheduling an appointment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
    pub success_message: String,
}

/// Response containing a pet's appointments, soonest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}

/// Response containing a pet's recent activity, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityListResponse {
    pub entries: Vec<ActivityEntry>,
}

/// Response containing the filtered inbox, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MailListResponse {
    pub messages: Vec<MailMessage>,
}

/// Everything the dashboard renders for one pet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardView {
    pub pet: Pet,
    /// Human age label derived from the birthday (e.g. "1 year, 3 months")
    pub age_display: String,
    /// Breed with species fallback, never empty
    pub breed_label: String,
    /// Incomplete tasks in insertion order
    pub active_tasks: Vec<Task>,
    /// Appointments sorted ascending by timestamp
    pub appointments: Vec<Appointment>,
    /// At most the five newest activity entries, newest first
    pub recent_activity: Vec<ActivityEntry>,
    /// Persistent banner shown when live updates degrade
    pub connection_notice: Option<String>,
}

/// One card on the pet selection screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetCard {
    pub id: String,
    pub name: String,
    pub breed_label: String,
    pub age_display: String,
    /// Always renderable: falls back to the placeholder image
    pub image_url: String,
}

/// The pet selection screen, cards in registration order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetSelectionView {
    pub cards: Vec<PetCard>,
}
