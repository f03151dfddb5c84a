use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::domain::session::Session;
use crate::storage::{DocumentStore, DocumentStoreExt, KeyLocks, RecordKey};
use shared::{
    ActivePetResponse, CreatePetRequest, Pet, PetImageSource, PetListResponse, PetResponse,
    SetActivePetResponse,
};

pub(crate) type PetMap = BTreeMap<String, Pet>;

/// Service for registering pets and remembering the last one opened
#[derive(Clone)]
pub struct PetService {
    store: Arc<dyn DocumentStore>,
    locks: KeyLocks,
    session: Session,
}

impl PetService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: KeyLocks, session: Session) -> Self {
        Self {
            store,
            locks,
            session,
        }
    }

    /// Register a new pet
    pub async fn create_pet(&self, request: CreatePetRequest) -> DomainResult<PetResponse> {
        info!(
            "Creating pet: name={}, species={}",
            request.name, request.species
        );

        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPetName.into());
        }

        // An empty birthday field means "not entered", not an error
        let birthday = request
            .birthday
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(ref birthday) = birthday {
            validate_birthday(birthday)?;
        }

        // The image must be storable before anything is persisted, so a bad
        // upload never leaves a half-written profile behind
        let image_url = match request.image {
            Some(source) => resolve_image(source)?,
            None => None,
        };

        let pet = Pet {
            id: Pet::generate_id(),
            name: name.to_string(),
            species: request.species.trim().to_string(),
            breed: request.breed.trim().to_string(),
            birthday,
            image_url,
            date_added: Utc::now().to_rfc3339(),
        };

        let key = RecordKey::pets(self.session.user_id());
        let _guard = self.locks.acquire(&key.lock_key()).await;
        let mut pets: PetMap = self.store.read_or_default(&key).await?;
        pets.insert(pet.id.clone(), pet.clone());
        self.store.write(&key, &pets).await?;

        info!("Created pet {} with ID {}", pet.name, pet.id);

        let success_message = format!("Success! {} has been added to your PawPal!", pet.name);
        Ok(PetResponse {
            pet,
            success_message,
        })
    }

    /// List all registered pets, oldest registration first
    pub async fn list_pets(&self) -> DomainResult<PetListResponse> {
        let key = RecordKey::pets(self.session.user_id());
        let pets: PetMap = self.store.read_or_default(&key).await?;

        let mut pets: Vec<Pet> = pets.into_values().collect();
        pets.sort_by(|a, b| a.date_added.cmp(&b.date_added).then_with(|| a.id.cmp(&b.id)));

        info!("Found {} pets", pets.len());

        Ok(PetListResponse { pets })
    }

    /// Get a pet by ID
    pub async fn get_pet(&self, pet_id: &str) -> DomainResult<Option<Pet>> {
        let key = RecordKey::pets(self.session.user_id());
        let pets: PetMap = self.store.read_or_default(&key).await?;

        let pet = pets.get(pet_id).cloned();
        if pet.is_none() {
            warn!("Pet not found: {}", pet_id);
        }

        Ok(pet)
    }

    /// The pet the owner opened last, if it still exists. A remembered ID
    /// that no longer resolves is ignored rather than reported.
    pub async fn active_pet(&self) -> DomainResult<ActivePetResponse> {
        let key = RecordKey::active_pet(self.session.user_id());
        let remembered: Option<String> = self.store.read_opt(&key).await?;

        let active_pet = match remembered {
            Some(pet_id) => self.get_pet(&pet_id).await?,
            None => None,
        };

        Ok(ActivePetResponse { active_pet })
    }

    /// Remember the pet the owner just opened
    pub async fn set_active_pet(&self, pet_id: &str) -> DomainResult<SetActivePetResponse> {
        info!("Setting active pet: {}", pet_id);

        let pet = self
            .get_pet(pet_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Pet", pet_id))?;

        let key = RecordKey::active_pet(self.session.user_id());
        let _guard = self.locks.acquire(&key.lock_key()).await;
        self.store.write(&key, &pet.id).await?;

        Ok(SetActivePetResponse {
            success_message: format!("{} is now the active pet", pet.name),
            active_pet: pet,
        })
    }
}

/// Look up a pet another service is about to touch records for
pub(crate) async fn require_pet(
    store: &dyn DocumentStore,
    session: &Session,
    pet_id: &str,
) -> DomainResult<Pet> {
    let pets: PetMap = store
        .read_or_default(&RecordKey::pets(session.user_id()))
        .await?;

    pets.get(pet_id)
        .cloned()
        .ok_or_else(|| DomainError::not_found("Pet", pet_id))
}

fn validate_birthday(birthday: &str) -> Result<(), ValidationError> {
    // Strict YYYY-MM-DD: chrono alone would also accept unpadded fields
    if birthday.len() != 10 {
        return Err(ValidationError::InvalidBirthday);
    }

    let date = NaiveDate::parse_from_str(birthday, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidBirthday)?;

    if !(1900..=2100).contains(&date.year()) {
        return Err(ValidationError::InvalidBirthday);
    }

    Ok(())
}

/// Turn the supplied image into a URL the pet record can carry. Uploaded
/// bytes become a data URL, the way the original read files in the browser.
fn resolve_image(source: PetImageSource) -> Result<Option<String>, ValidationError> {
    match source {
        PetImageSource::Url { url } => {
            let url = url.trim();
            if url.is_empty() {
                Ok(None)
            } else {
                Ok(Some(url.to_string()))
            }
        }
        PetImageSource::Upload { content_type, data } => {
            if !content_type.starts_with("image/") {
                return Err(ValidationError::UnsupportedImage);
            }
            let encoded = BASE64.encode(&data);
            Ok(Some(format!("data:{};base64,{}", content_type, encoded)))
        }
    }
}
