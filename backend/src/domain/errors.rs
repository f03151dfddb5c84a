//! Error taxonomy for the domain layer. The three variants of
//! [`DomainError`] map to the three caller reactions: re-prompt the owner,
//! fall back to pet selection, or report and abandon the operation.

use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Pet name cannot be empty")]
    EmptyPetName,
    #[error("Birthday must be a valid YYYY-MM-DD date between 1900 and 2100")]
    InvalidBirthday,
    #[error("Pet images must carry an image/* content type")]
    UnsupportedImage,
    #[error("Task text cannot be empty")]
    EmptyTaskText,
    #[error("Appointment title cannot be empty")]
    EmptyAppointmentTitle,
    #[error("Appointment date is required")]
    MissingAppointmentDate,
    #[error("Appointment time is required")]
    MissingAppointmentTime,
    #[error("Appointment date must be a valid YYYY-MM-DD date")]
    InvalidAppointmentDate,
    #[error("Appointment time must be a valid HH:MM time")]
    InvalidAppointmentTime,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Storage failure: {0}")]
    Persistence(#[from] StoreError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
