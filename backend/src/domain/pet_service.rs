//! Pet management and per-pet feeding guidance.
//!
//! ## Business Rules
//!
//! - Names are trimmed, non-empty and at most 100 characters
//! - Weight, height and a food energy override must be positive when given
//! - Deleting a pet removes its events, expenses and necessities, and cancels
//!   its pending litter reminder

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::{Pet, DEFAULT_FOOD_KCAL_PER_100G};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::feeding::FeedingGuidance;
use crate::errors::{MeadowError, Result};
use crate::io::NotificationScheduler;
use crate::storage::{CareEventStorage, PetStorage, UserProfileStorage};

const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePetCommand {
    pub name: String,
    pub species: String,
    pub birth_date: Option<NaiveDate>,
    pub photo_data: Option<Vec<u8>>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub food_kcal_per_100g: Option<f64>,
}

pub struct PetService<S> {
    repository: Arc<S>,
    notifier: Arc<dyn NotificationScheduler>,
}

impl<S> Clone for PetService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S> PetService<S>
where
    S: PetStorage + CareEventStorage + UserProfileStorage,
{
    pub fn new(repository: Arc<S>, notifier: Arc<dyn NotificationScheduler>) -> Self {
        Self { repository, notifier }
    }

    pub async fn create_pet(&self, command: CreatePetCommand, now: DateTime<Utc>) -> Result<Pet> {
        let mut pet = Pet::new(command.name.trim(), command.species.trim(), now);
        pet.birth_date = command.birth_date;
        pet.photo_data = command.photo_data;
        pet.weight_kg = command.weight_kg;
        pet.height_cm = command.height_cm;
        pet.food_kcal_per_100g = command.food_kcal_per_100g;

        validate_pet(&pet)?;
        self.repository.store_pet(&pet).await?;

        info!("Created pet {} ({})", pet.name, pet.id);
        Ok(pet)
    }

    pub async fn get_pet(&self, pet_id: Uuid) -> Result<Pet> {
        self.repository
            .get_pet(pet_id)
            .await?
            .ok_or(MeadowError::NotFound { entity: "pet", id: pet_id })
    }

    pub async fn list_pets(&self) -> Result<Vec<Pet>> {
        self.repository.list_pets().await
    }

    /// Persist edits already applied to `pet`
    pub async fn update_pet(&self, pet: &Pet) -> Result<()> {
        validate_pet(pet)?;
        self.repository.update_pet(pet).await
    }

    pub async fn delete_pet(&self, pet_id: Uuid) -> Result<bool> {
        let deleted = self.repository.delete_pet(pet_id).await?;
        if deleted {
            info!("Deleted pet {}", pet_id);
            if let Err(e) = self.notifier.cancel_litter_reminder(pet_id).await {
                warn!("Could not cancel litter reminder for deleted pet {}: {}", pet_id, e);
            }
        }
        Ok(deleted)
    }

    /// Two-day feeding guidance for one pet, None when its weight is unknown
    pub async fn feeding_guidance(&self, pet_id: Uuid, now: DateTime<Utc>) -> Result<Option<FeedingGuidance>> {
        let pet = self.get_pet(pet_id).await?;
        let default_kcal = self
            .repository
            .get_profile()
            .await?
            .map(|profile| profile.default_food_kcal_per_100g)
            .unwrap_or(DEFAULT_FOOD_KCAL_PER_100G);
        let events = self.repository.list_events_for_pet(pet_id).await?;

        Ok(FeedingGuidance::calculate(&pet, &events, default_kcal, now))
    }
}

fn validate_pet(pet: &Pet) -> Result<()> {
    let name = pet.name.trim();
    if name.is_empty() {
        return Err(MeadowError::validation("Pet name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(MeadowError::validation(format!(
            "Pet name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    for (label, value) in [
        ("Weight", pet.weight_kg),
        ("Height", pet.height_cm),
        ("Food energy", pet.food_kcal_per_100g),
    ] {
        if let Some(value) = value {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeadowError::validation(format!("{} must be a positive number", label)));
            }
        }
    }
    Ok(())
}
