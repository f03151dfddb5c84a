//! Addressing for stored records. Every record belongs to one user; the
//! per-pet records additionally carry the pet's ID.

/// Which record of a user's data a key points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Map of pet ID to pet profile
    Pets,
    /// ID of the pet the owner opened last
    ActivePet,
    /// Map of task ID to task for one pet
    Tasks { pet_id: String },
    /// Map of appointment ID to appointment for one pet
    Appointments { pet_id: String },
    /// Map of activity entry ID to entry for one pet
    Activity { pet_id: String },
    /// Map of message ID to mail message
    Mail,
}

/// Fully qualified address of one stored record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    user_id: String,
    kind: RecordKind,
}

impl RecordKey {
    pub fn new(user_id: &str, kind: RecordKind) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind,
        }
    }

    pub fn pets(user_id: &str) -> Self {
        Self::new(user_id, RecordKind::Pets)
    }

    pub fn active_pet(user_id: &str) -> Self {
        Self::new(user_id, RecordKind::ActivePet)
    }

    pub fn tasks(user_id: &str, pet_id: &str) -> Self {
        Self::new(
            user_id,
            RecordKind::Tasks {
                pet_id: pet_id.to_string(),
            },
        )
    }

    pub fn appointments(user_id: &str, pet_id: &str) -> Self {
        Self::new(
            user_id,
            RecordKind::Appointments {
                pet_id: pet_id.to_string(),
            },
        )
    }

    pub fn activity(user_id: &str, pet_id: &str) -> Self {
        Self::new(
            user_id,
            RecordKind::Activity {
                pet_id: pet_id.to_string(),
            },
        )
    }

    pub fn mail(user_id: &str) -> Self {
        Self::new(user_id, RecordKind::Mail)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    /// Relative path of the record. Doubles as the change-notification topic.
    pub fn storage_path(&self) -> String {
        match &self.kind {
            RecordKind::Pets => format!("users/{}/pets", self.user_id),
            RecordKind::ActivePet => format!("users/{}/active_pet", self.user_id),
            RecordKind::Tasks { pet_id } => {
                format!("users/{}/pets/{}/tasks", self.user_id, pet_id)
            }
            RecordKind::Appointments { pet_id } => {
                format!("users/{}/pets/{}/appointments", self.user_id, pet_id)
            }
            RecordKind::Activity { pet_id } => {
                format!("users/{}/pets/{}/activity", self.user_id, pet_id)
            }
            RecordKind::Mail => format!("users/{}/mail", self.user_id),
        }
    }

    /// Key under which read-modify-write cycles serialize: per-pet records
    /// share their pet's lock, the rest share the user's lock.
    pub fn lock_key(&self) -> String {
        match &self.kind {
            RecordKind::Tasks { pet_id }
            | RecordKind::Appointments { pet_id }
            | RecordKind::Activity { pet_id } => format!("{}/{}", self.user_id, pet_id),
            _ => self.user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_paths() {
        assert_eq!(
            RecordKey::pets("user::a").storage_path(),
            "users/user::a/pets"
        );
        assert_eq!(
            RecordKey::active_pet("user::a").storage_path(),
            "users/user::a/active_pet"
        );
        assert_eq!(
            RecordKey::tasks("user::a", "pet::1").storage_path(),
            "users/user::a/pets/pet::1/tasks"
        );
        assert_eq!(
            RecordKey::appointments("user::a", "pet::1").storage_path(),
            "users/user::a/pets/pet::1/appointments"
        );
        assert_eq!(
            RecordKey::activity("user::a", "pet::1").storage_path(),
            "users/user::a/pets/pet::1/activity"
        );
        assert_eq!(RecordKey::mail("user::a").storage_path(), "users/user::a/mail");
    }

    #[test]
    fn test_lock_keys() {
        // All of one pet's records contend on the same lock
        let tasks = RecordKey::tasks("user::a", "pet::1");
        let activity = RecordKey::activity("user::a", "pet::1");
        assert_eq!(tasks.lock_key(), activity.lock_key());

        // Different pets do not
        let other = RecordKey::tasks("user::a", "pet::2");
        assert_ne!(tasks.lock_key(), other.lock_key());

        // User-level records share the user lock
        assert_eq!(
            RecordKey::pets("user::a").lock_key(),
            RecordKey::mail("user::a").lock_key()
        );
    }
}
