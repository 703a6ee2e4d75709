//! User profile onboarding and settings.
//!
//! Toggling a reminder on asks the host for notification permission first. A
//! declined prompt leaves the stored profile exactly as it was. Litter
//! reminder changes rerun the reminder orchestration so pending reminders
//! match the new settings right away.

use chrono::{DateTime, FixedOffset, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::{UserProfile, DEFAULT_PROFILE_NAME};
use std::sync::Arc;

use crate::domain::litter_reminder_service::LitterReminderService;
use crate::errors::{MeadowError, Result};
use crate::io::{NotificationScheduler, PermissionStatus};
use crate::storage::{CareEventStorage, PetStorage, UserProfileStorage};

pub const DAILY_REMINDER_HOUR: u32 = 20;
pub const DAILY_REMINDER_MINUTE: u32 = 0;
pub const MAX_LITTER_THRESHOLD_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LitterSettings {
    pub hour: u32,
    pub minute: u32,
    pub threshold_days: u32,
    pub playful_emoji: bool,
}

impl LitterSettings {
    pub fn validate(&self) -> Result<()> {
        if self.hour > 23 {
            return Err(MeadowError::validation(format!("Reminder hour {} is not a valid hour", self.hour)));
        }
        if self.minute > 59 {
            return Err(MeadowError::validation(format!(
                "Reminder minute {} is not a valid minute",
                self.minute
            )));
        }
        if !(1..=MAX_LITTER_THRESHOLD_DAYS).contains(&self.threshold_days) {
            return Err(MeadowError::validation(format!(
                "Reminder threshold must be between 1 and {} days",
                MAX_LITTER_THRESHOLD_DAYS
            )));
        }
        Ok(())
    }
}

pub struct ProfileService<S> {
    repository: Arc<S>,
    notifier: Arc<dyn NotificationScheduler>,
    reminders: LitterReminderService<S>,
}

impl<S> Clone for ProfileService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
            reminders: self.reminders.clone(),
        }
    }
}

impl<S> ProfileService<S>
where
    S: UserProfileStorage + PetStorage + CareEventStorage,
{
    pub fn new(
        repository: Arc<S>,
        notifier: Arc<dyn NotificationScheduler>,
        reminders: LitterReminderService<S>,
    ) -> Self {
        Self {
            repository,
            notifier,
            reminders,
        }
    }

    pub async fn get_profile(&self) -> Result<Option<UserProfile>> {
        self.repository.get_profile().await
    }

    /// Return the profile, creating it on first launch with the trial starting at `now`
    pub async fn ensure_profile(&self, name: Option<&str>, now: DateTime<Utc>) -> Result<UserProfile> {
        if let Some(existing) = self.repository.get_profile().await? {
            return Ok(existing);
        }

        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_PROFILE_NAME);
        let profile = UserProfile::new(name, now);
        self.repository.store_profile(&profile).await?;

        info!("Created user profile {} with trial starting {}", profile.id, now);
        Ok(profile)
    }

    pub async fn permission_status(&self) -> Result<PermissionStatus> {
        self.notifier.check_permission_status().await
    }

    pub async fn set_daily_reminders(&self, enabled: bool) -> Result<UserProfile> {
        let mut profile = self.require_profile().await?;

        if enabled {
            if !self.notifier.request_permission().await? {
                warn!("Notification permission declined, daily reminders stay off");
                return Err(MeadowError::PermissionDenied);
            }
            self.notifier
                .schedule_daily_reminder(DAILY_REMINDER_HOUR, DAILY_REMINDER_MINUTE)
                .await?;
        } else {
            self.notifier.cancel_daily_reminder().await?;
        }

        profile.notifications_enabled = enabled;
        self.repository.update_profile(&profile).await?;
        info!("Daily reminders {}", if enabled { "enabled" } else { "disabled" });
        Ok(profile)
    }

    pub async fn set_litter_reminders(&self, enabled: bool, now: DateTime<FixedOffset>) -> Result<UserProfile> {
        let mut profile = self.require_profile().await?;

        if enabled {
            if !self.notifier.request_permission().await? {
                warn!("Notification permission declined, litter reminders stay off");
                return Err(MeadowError::PermissionDenied);
            }
            profile.litter_reminders_enabled = true;
            self.repository.update_profile(&profile).await?;
            self.reminders.run(now).await?;
        } else {
            self.notifier.cancel_all_litter_reminders().await?;
            profile.litter_reminders_enabled = false;
            self.repository.update_profile(&profile).await?;
        }

        info!("Litter reminders {}", if enabled { "enabled" } else { "disabled" });
        Ok(profile)
    }

    pub async fn update_litter_settings(
        &self,
        settings: LitterSettings,
        now: DateTime<FixedOffset>,
    ) -> Result<UserProfile> {
        settings.validate()?;
        let mut profile = self.require_profile().await?;

        profile.litter_reminder_hour = settings.hour;
        profile.litter_reminder_minute = settings.minute;
        profile.litter_reminder_threshold_days = settings.threshold_days;
        profile.playful_emoji_enabled = settings.playful_emoji;
        self.repository.update_profile(&profile).await?;

        if profile.litter_reminders_enabled {
            self.reminders.run(now).await?;
        }
        Ok(profile)
    }

    pub async fn set_default_food_kcal(&self, kcal_per_100g: f64) -> Result<UserProfile> {
        if !kcal_per_100g.is_finite() || kcal_per_100g <= 0.0 {
            return Err(MeadowError::validation("Food energy must be a positive number"));
        }
        let mut profile = self.require_profile().await?;
        profile.default_food_kcal_per_100g = kcal_per_100g;
        self.repository.update_profile(&profile).await?;
        Ok(profile)
    }

    async fn require_profile(&self) -> Result<UserProfile> {
        self.repository.get_profile().await?.ok_or(MeadowError::ProfileMissing)
    }
}
