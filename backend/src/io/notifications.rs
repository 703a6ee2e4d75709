//! Notification delivery contract.
//!
//! The host platform owns actual delivery; the backend only decides what to
//! schedule and when. Reminder text is rendered here so every scheduler
//! implementation shows the same content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;

pub const DAILY_REMINDER_ID: &str = "dailyReminder";
pub const LITTER_REMINDER_PREFIX: &str = "litterReminder_";

/// Authorization state reported by the host notification center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

impl PermissionStatus {
    pub fn allows_delivery(&self) -> bool {
        matches!(self, PermissionStatus::Authorized | PermissionStatus::Provisional)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// Scheduling contract implemented by the host.
///
/// Scheduling a reminder replaces any pending reminder with the same
/// identifier. Litter reminders are one-shot; the daily reminder repeats.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Ask the user for authorization. Returns whether it was granted.
    async fn request_permission(&self) -> Result<bool>;

    async fn schedule_daily_reminder(&self, hour: u32, minute: u32) -> Result<()>;

    async fn cancel_daily_reminder(&self) -> Result<()>;

    async fn check_permission_status(&self) -> Result<PermissionStatus>;

    async fn schedule_litter_reminder(
        &self,
        pet_id: Uuid,
        pet_name: &str,
        hour: u32,
        minute: u32,
        playful: bool,
    ) -> Result<()>;

    async fn cancel_litter_reminder(&self, pet_id: Uuid) -> Result<()>;

    /// Cancel every pending request whose id carries [`LITTER_REMINDER_PREFIX`]
    async fn cancel_all_litter_reminders(&self) -> Result<()>;
}

/// Identifier of the pending litter reminder for one pet
pub fn litter_reminder_id(pet_id: Uuid) -> String {
    format!("{}{}", LITTER_REMINDER_PREFIX, pet_id)
}

pub fn is_litter_reminder_id(identifier: &str) -> bool {
    identifier.starts_with(LITTER_REMINDER_PREFIX)
}

pub fn daily_reminder_content() -> NotificationContent {
    NotificationContent {
        title: "Daily Pet Care Reminder".to_string(),
        body: "Don't forget to log today's care events for your pets!".to_string(),
    }
}

pub fn litter_reminder_content(pet_name: &str, playful: bool) -> NotificationContent {
    if playful {
        NotificationContent {
            title: "Litter Time 💩".to_string(),
            body: format!("Time to log a litter clean for {} 💩", pet_name),
        }
    } else {
        NotificationContent {
            title: "Litter Reminder".to_string(),
            body: format!("Reminder: log a litter clean for {}.", pet_name),
        }
    }
}
