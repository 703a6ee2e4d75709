//! Logging care events and the home screen activity summary.

use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use shared::{CareEvent, CareEventKind, CareEventType, DateRange};
use std::sync::Arc;

use crate::errors::{MeadowError, Result};
use crate::storage::{CareEventStorage, PetStorage};

const RECENT_EVENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeSummary {
    /// Events of the last 24 hours, newest first
    pub last_24_hours: Vec<CareEvent>,
    /// Distinct types among `last_24_hours`, ordered by tag
    pub event_types: Vec<CareEventType>,
    pub most_recent: Option<CareEvent>,
    /// The newest events regardless of age
    pub recent: Vec<CareEvent>,
}

#[derive(Clone)]
pub struct ActivityService<S> {
    repository: Arc<S>,
}

impl<S> ActivityService<S>
where
    S: CareEventStorage + PetStorage,
{
    pub fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    /// Store a new event after checking its pet exists.
    ///
    /// A feeding amount of zero or less is dropped rather than stored.
    pub async fn log_event(&self, mut event: CareEvent) -> Result<CareEvent> {
        if let Some(pet_id) = event.pet_id {
            if self.repository.get_pet(pet_id).await?.is_none() {
                return Err(MeadowError::NotFound { entity: "pet", id: pet_id });
            }
        }
        if let CareEventKind::Feeding(details) = &mut event.kind {
            details.food_grams = details.food_grams.filter(|grams| *grams > 0.0);
        }

        self.repository.store_event(&event).await?;
        info!("Logged {} event {}", event.event_type().tag(), event.id);
        Ok(event)
    }

    pub async fn home_summary(&self, now: DateTime<Utc>) -> Result<HomeSummary> {
        let window = DateRange::new(now - Duration::hours(24), now);
        let last_24_hours = self.repository.list_events_in_range(&window).await?;

        let mut event_types: Vec<CareEventType> = last_24_hours.iter().map(|e| e.event_type()).collect();
        event_types.sort_by_key(|t| t.tag());
        event_types.dedup();

        let mut recent = self.repository.list_events().await?;
        recent.truncate(RECENT_EVENT_LIMIT);

        Ok(HomeSummary {
            most_recent: last_24_hours.first().cloned(),
            last_24_hours,
            event_types,
            recent,
        })
    }
}
