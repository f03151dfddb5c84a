//! # Domain Module
//!
//! Business logic for pet care tracking, independent of the storage backend
//! and of whatever surface (REST, embedded UI) calls it.
//!
//! ## Module Organization
//!
//! - **pet_service**: Pet registration, lookup, and the remembered active pet
//! - **task_service**: Daily task checklist with seeded defaults and
//!   completion logging
//! - **appointment_service**: Scheduling with derived sort timestamps
//! - **activity_service**: The capped recent-activity feed
//! - **mail_service**: Notification inbox with filters and welcome seeding
//!
//! ## Business Rules
//!
//! - Pet names are required; everything else about a pet is optional
//! - A pet with no tasks at all gets five defaults, exactly once
//! - Completing a task is idempotent and logs one activity entry
//! - Appointment listings are always sorted by their derived timestamp
//! - The activity feed never holds more than five entries
//! - All record IDs embed their creation stamp and never collide
//!
//! Services receive an explicit [`Session`] instead of reading global
//! state, and every read-modify-write runs under the record's key lock.
//!
//! [`Session`]: session::Session

pub mod activity_service;
pub mod appointment_service;
pub mod errors;
pub mod mail_service;
pub mod pet_service;
pub mod session;
pub mod task_service;

pub use activity_service::ActivityService;
pub use appointment_service::AppointmentService;
pub use errors::{DomainError, DomainResult, ValidationError};
pub use mail_service::MailService;
pub use pet_service::PetService;
pub use session::Session;
pub use task_service::TaskService;
