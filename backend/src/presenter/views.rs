//! Pure view building. Everything in here is a function of its inputs: no
//! I/O, no clocks (callers pass today's date), so every display rule is
//! directly testable.

use chrono::{Datelike, NaiveDate};
use std::cmp::Reverse;

use crate::domain::activity_service::MAX_ENTRIES;
use shared::{ActivityEntry, Appointment, DashboardView, Pet, PetCard, PetSelectionView, Task};

/// Shown on cards for pets without a picture of their own
pub const PLACEHOLDER_PET_IMAGE: &str = "https://placehold.co/150x150/7378D3/ffffff?text=Pet";

/// Assemble the dashboard for one pet from its raw records
pub fn build_dashboard(
    pet: &Pet,
    tasks: &[Task],
    appointments: &[Appointment],
    activity: &[ActivityEntry],
    today: NaiveDate,
) -> DashboardView {
    let mut active_tasks: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
    active_tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut appointments = appointments.to_vec();
    appointments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut recent_activity = activity.to_vec();
    recent_activity.sort_by_key(|e| Reverse(e.extract_timestamp().unwrap_or(0)));
    recent_activity.truncate(MAX_ENTRIES);

    DashboardView {
        age_display: format_age(pet.birthday.as_deref(), today),
        breed_label: breed_label(&pet.breed, &pet.species),
        pet: pet.clone(),
        active_tasks,
        appointments,
        recent_activity,
        connection_notice: None,
    }
}

/// Assemble the pet selection screen, cards in registration order
pub fn build_pet_selection(pets: &[Pet], today: NaiveDate) -> PetSelectionView {
    let mut pets = pets.to_vec();
    pets.sort_by(|a, b| a.date_added.cmp(&b.date_added).then_with(|| a.id.cmp(&b.id)));

    let cards = pets
        .into_iter()
        .map(|pet| {
            let breed_label = breed_label(&pet.breed, &pet.species);
            let age_display = format_age(pet.birthday.as_deref(), today);
            let image_url = pet
                .image_url
                .unwrap_or_else(|| PLACEHOLDER_PET_IMAGE.to_string());
            PetCard {
                id: pet.id,
                name: pet.name,
                breed_label,
                age_display,
                image_url,
            }
        })
        .collect();

    PetSelectionView { cards }
}

/// Breed with species fallback, never empty
pub fn breed_label(breed: &str, species: &str) -> String {
    let breed = breed.trim();
    if !breed.is_empty() {
        return breed.to_string();
    }

    let species = species.trim();
    if !species.is_empty() {
        return species.to_string();
    }

    "Unknown Breed".to_string()
}

/// Human age label for a birthday. Pets under two years show months; a
/// missing, malformed, or future birthday reads as unknown.
pub fn format_age(birthday: Option<&str>, today: NaiveDate) -> String {
    let Some(birthday) = birthday else {
        return "Age Unknown".to_string();
    };

    let Ok(birth) = NaiveDate::parse_from_str(birthday.trim(), "%Y-%m-%d") else {
        return "Age Unknown".to_string();
    };

    let mut years = today.year() - birth.year();
    let mut months = today.month() as i32 - birth.month() as i32;
    if (today.day() as i32) < birth.day() as i32 {
        months -= 1;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    if years < 0 {
        return "Age Unknown".to_string();
    }

    let month_text = |months: i32| {
        if months == 1 {
            "1 month".to_string()
        } else {
            format!("{} months", months)
        }
    };

    if years == 0 {
        if months == 0 {
            return "Newborn".to_string();
        }
        return month_text(months);
    }

    if years == 1 {
        if months == 0 {
            return "1 year".to_string();
        }
        return format!("1 year, {}", month_text(months));
    }

    format!("{} years", years)
}
