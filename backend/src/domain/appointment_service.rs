use chrono::{NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::{DomainResult, ValidationError};
use crate::domain::pet_service::require_pet;
use crate::domain::session::Session;
use crate::storage::{DocumentStore, DocumentStoreExt, KeyLocks, RecordKey};
use shared::{AddAppointmentRequest, Appointment, AppointmentListResponse, AppointmentResponse};

pub(crate) type AppointmentMap = BTreeMap<String, Appointment>;

/// Service for a pet's upcoming appointments
#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn DocumentStore>,
    locks: KeyLocks,
    session: Session,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: KeyLocks, session: Session) -> Self {
        Self {
            store,
            locks,
            session,
        }
    }

    fn appointments_key(&self, pet_id: &str) -> RecordKey {
        RecordKey::appointments(self.session.user_id(), pet_id)
    }

    /// Schedule an appointment. Title, date and time are all required; the
    /// sort timestamp is derived from date + time.
    pub async fn add_appointment(
        &self,
        pet_id: &str,
        request: AddAppointmentRequest,
    ) -> DomainResult<AppointmentResponse> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyAppointmentTitle.into());
        }

        let date = request.date.trim().to_string();
        if date.is_empty() {
            return Err(ValidationError::MissingAppointmentDate.into());
        }

        let time = request.time.trim().to_string();
        if time.is_empty() {
            return Err(ValidationError::MissingAppointmentTime.into());
        }

        let timestamp = appointment_timestamp(&date, &time)?;

        require_pet(self.store.as_ref(), &self.session, pet_id).await?;

        let key = self.appointments_key(pet_id);
        let _guard = self.locks.acquire(&key.lock_key()).await;
        let mut appointments: AppointmentMap = self.store.read_or_default(&key).await?;

        let stamp = unused_stamp(&appointments, Utc::now().timestamp_millis() as u64);
        let appointment = Appointment {
            id: Appointment::generate_id(stamp),
            title,
            date,
            time,
            timestamp,
        };
        appointments.insert(appointment.id.clone(), appointment.clone());
        self.store.write(&key, &appointments).await?;

        info!(
            "Added appointment {} for pet {} at {}",
            appointment.id, pet_id, timestamp
        );

        Ok(AppointmentResponse {
            appointment,
            success_message: "Appointment added successfully".to_string(),
        })
    }

    /// A pet's appointments, always soonest first. No caller can observe an
    /// unsorted sequence.
    pub async fn list_appointments(&self, pet_id: &str) -> DomainResult<AppointmentListResponse> {
        let appointments: AppointmentMap = self
            .store
            .read_or_default(&self.appointments_key(pet_id))
            .await?;

        let mut appointments: Vec<Appointment> = appointments.into_values().collect();
        appointments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        Ok(AppointmentListResponse { appointments })
    }
}

/// Epoch millis for a local "YYYY-MM-DD" + "HH:MM" pair, read as UTC so the
/// sort key is stable across machines
fn appointment_timestamp(date: &str, time: &str) -> Result<i64, ValidationError> {
    if date.len() != 10 {
        return Err(ValidationError::InvalidAppointmentDate);
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidAppointmentDate)?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| ValidationError::InvalidAppointmentTime)?;

    Ok(date.and_time(time).and_utc().timestamp_millis())
}

fn unused_stamp(existing: &AppointmentMap, mut stamp: u64) -> u64 {
    while existing.contains_key(&Appointment::generate_id(stamp)) {
        stamp += 1;
    }
    stamp
}
