//! Litter reminder orchestration.
//!
//! The host calls [`LitterReminderService::run`] whenever it wants reminders
//! brought up to date (app launch, settings change, a background wake). There
//! is no internal timer. For every pet the run evaluates eligibility, asks the
//! notification scheduler for a reminder when the pet is due, and records the
//! send so that a second run on the same calendar day does nothing.
//!
//! Scheduling is fire-and-forget: the send is recorded as soon as the schedule
//! call has been issued, whatever it returned. A failed call is logged and not
//! retried until the next calendar day.

use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::litter::{evaluate_litter_reminder, last_litter_date, LitterReminderState};
use crate::errors::Result;
use crate::io::NotificationScheduler;
use crate::storage::{CareEventStorage, PetStorage, UserProfileStorage};

/// What happened to one pet during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetReminderOutcome {
    pub pet_id: Uuid,
    pub pet_name: String,
    pub state: LitterReminderState,
    /// The scheduler accepted a reminder for this pet
    pub scheduled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LitterReminderReport {
    /// False when there is no profile or litter reminders are switched off
    pub enabled: bool,
    pub outcomes: Vec<PetReminderOutcome>,
}

impl LitterReminderReport {
    pub fn scheduled_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.scheduled).count()
    }
}

pub struct LitterReminderService<S> {
    repository: Arc<S>,
    notifier: Arc<dyn NotificationScheduler>,
}

impl<S> Clone for LitterReminderService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S> LitterReminderService<S>
where
    S: PetStorage + CareEventStorage + UserProfileStorage,
{
    pub fn new(repository: Arc<S>, notifier: Arc<dyn NotificationScheduler>) -> Self {
        Self { repository, notifier }
    }

    /// Bring litter reminders up to date as of `now`.
    ///
    /// `now` carries the user's UTC offset; its local date decides what
    /// "today" means for the once-per-day rule.
    pub async fn run(&self, now: DateTime<FixedOffset>) -> Result<LitterReminderReport> {
        let profile = match self.repository.get_profile().await? {
            Some(profile) if profile.litter_reminders_enabled => profile,
            _ => {
                debug!("Litter reminders disabled or no profile, nothing to do");
                return Ok(LitterReminderReport::default());
            }
        };

        let now_utc = now.with_timezone(&Utc);
        let today = now.date_naive();
        let pets = self.repository.list_pets().await?;
        info!("Checking litter reminders for {} pets on {}", pets.len(), today);

        let mut outcomes = Vec::with_capacity(pets.len());
        for mut pet in pets {
            let mut outcome = PetReminderOutcome {
                pet_id: pet.id,
                pet_name: pet.name.clone(),
                state: LitterReminderState::Unknown,
                scheduled: false,
            };

            let last_litter = if pet.last_litter_reminder_sent_on == Some(today) {
                None
            } else {
                match self.repository.list_events_for_pet(pet.id).await {
                    Ok(events) => last_litter_date(&events),
                    Err(e) => {
                        warn!("Could not read events for pet {}: {}", pet.id, e);
                        outcomes.push(outcome);
                        continue;
                    }
                }
            };

            outcome.state = evaluate_litter_reminder(
                &pet,
                last_litter,
                profile.litter_reminder_threshold_days,
                now_utc,
                today,
            );

            if outcome.state == LitterReminderState::Eligible {
                let scheduled = self
                    .notifier
                    .schedule_litter_reminder(
                        pet.id,
                        &pet.name,
                        profile.litter_reminder_hour,
                        profile.litter_reminder_minute,
                        profile.playful_emoji_enabled,
                    )
                    .await;
                match scheduled {
                    Ok(()) => outcome.scheduled = true,
                    Err(e) => warn!("Failed to schedule litter reminder for {}: {}", pet.id, e),
                }

                pet.record_litter_reminder(now_utc, today);
                if let Err(e) = self.repository.update_pet(&pet).await {
                    warn!("Could not record litter reminder for {}: {}", pet.id, e);
                }
            }

            debug!("Pet {} litter reminder state: {:?}", pet.id, outcome.state);
            outcomes.push(outcome);
        }

        let report = LitterReminderReport { enabled: true, outcomes };
        info!("Scheduled {} litter reminders", report.scheduled_count());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::testing::{NotifierCall, RecordingNotifier};
    use crate::storage::sqlite::SqliteRepository;
    use crate::storage::test_utils::{utc, TestEnvironment};
    use chrono::{Duration, NaiveDate};
    use shared::{CareEvent, CareEventKind, Pet, UserProfile};

    struct Fixture {
        env: TestEnvironment,
        notifier: Arc<RecordingNotifier>,
        service: LitterReminderService<SqliteRepository>,
    }

    async fn fixture(reminders_enabled: bool) -> Fixture {
        let env = TestEnvironment::new().await;
        let mut profile = UserProfile::new("Sam", utc(2026, 1, 1, 9, 0));
        profile.litter_reminders_enabled = reminders_enabled;
        profile.litter_reminder_hour = 19;
        profile.litter_reminder_minute = 15;
        env.repository.store_profile(&profile).await.unwrap();

        let notifier = Arc::new(RecordingNotifier::new());
        let service = LitterReminderService::new(env.repository.clone(), notifier.clone());
        Fixture { env, notifier, service }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        utc(y, m, d, h, 0).with_timezone(&FixedOffset::east_opt(0).unwrap())
    }

    #[tokio::test]
    async fn test_never_littered_pet_gets_one_reminder_per_day() {
        let f = fixture(true).await;
        let pet = Pet::new("Miso", "Cat", utc(2026, 1, 1, 9, 0));
        f.env.repository.store_pet(&pet).await.unwrap();

        let first = f.service.run(at(2026, 3, 1, 8)).await.unwrap();
        assert_eq!(first.outcomes[0].state, LitterReminderState::Eligible);
        assert!(first.outcomes[0].scheduled);

        let second = f.service.run(at(2026, 3, 1, 21)).await.unwrap();
        assert_eq!(second.outcomes[0].state, LitterReminderState::AlreadySentToday);
        assert_eq!(second.scheduled_count(), 0);

        assert_eq!(
            f.notifier.calls(),
            vec![NotifierCall::ScheduleLitter {
                pet_id: pet.id,
                pet_name: "Miso".to_string(),
                hour: 19,
                minute: 15,
                playful: true,
            }]
        );

        let stored = f.env.repository.get_pet(pet.id).await.unwrap().unwrap();
        assert_eq!(stored.last_litter_reminder_sent_at, Some(utc(2026, 3, 1, 8, 0)));
        assert_eq!(stored.last_litter_reminder_sent_on, NaiveDate::from_ymd_opt(2026, 3, 1));

        let next_day = f.service.run(at(2026, 3, 2, 8)).await.unwrap();
        assert_eq!(next_day.scheduled_count(), 1);
    }

    #[tokio::test]
    async fn test_today_follows_local_offset() {
        let f = fixture(true).await;
        let pet = Pet::new("Miso", "Cat", utc(2026, 1, 1, 9, 0));
        f.env.repository.store_pet(&pet).await.unwrap();

        let east = FixedOffset::east_opt(10 * 3600).unwrap();
        // 2026-03-01 20:00 UTC is already 2026-03-02 in UTC+10
        let late_utc = utc(2026, 3, 1, 20, 0).with_timezone(&east);
        f.service.run(late_utc).await.unwrap();

        let stored = f.env.repository.get_pet(pet.id).await.unwrap().unwrap();
        assert_eq!(stored.last_litter_reminder_sent_on, NaiveDate::from_ymd_opt(2026, 3, 2));
    }

    #[tokio::test]
    async fn test_recent_litter_not_due() {
        let f = fixture(true).await;
        let pet = Pet::new("Miso", "Cat", utc(2026, 1, 1, 9, 0));
        f.env.repository.store_pet(&pet).await.unwrap();
        let cleaned = CareEvent::new(CareEventKind::Litter, utc(2026, 3, 1, 8, 0)).for_pet(pet.id);
        f.env.repository.store_event(&cleaned).await.unwrap();

        let report = f.service.run(at(2026, 3, 4, 8)).await.unwrap();
        assert_eq!(report.outcomes[0].state, LitterReminderState::NotYetDue);

        let later = f.service.run(at(2026, 3, 4, 8) + Duration::minutes(1)).await.unwrap();
        assert_eq!(later.outcomes[0].state, LitterReminderState::Eligible);
        assert_eq!(f.notifier.scheduled_litter_pets(), vec![pet.id]);
    }

    #[tokio::test]
    async fn test_disabled_or_missing_profile_does_nothing() {
        let f = fixture(false).await;
        f.env
            .repository
            .store_pet(&Pet::new("Miso", "Cat", utc(2026, 1, 1, 9, 0)))
            .await
            .unwrap();

        let report = f.service.run(at(2026, 3, 1, 8)).await.unwrap();
        assert!(!report.enabled);
        assert!(report.outcomes.is_empty());
        assert!(f.notifier.calls().is_empty());

        let empty = TestEnvironment::new().await;
        let service = LitterReminderService::new(empty.repository.clone(), f.notifier.clone());
        assert_eq!(service.run(at(2026, 3, 1, 8)).await.unwrap(), LitterReminderReport::default());
    }

    #[tokio::test]
    async fn test_scheduler_failure_is_recorded_and_not_retried_same_day() {
        let f = fixture(true).await;
        let failing = Pet::new("Miso", "Cat", utc(2026, 1, 1, 9, 0));
        let fine = Pet::new("Rex", "Dog", utc(2026, 1, 2, 9, 0));
        f.env.repository.store_pet(&failing).await.unwrap();
        f.env.repository.store_pet(&fine).await.unwrap();
        f.notifier.fail_for(failing.id);

        let report = f.service.run(at(2026, 3, 1, 8)).await.unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.scheduled_count(), 1);
        assert_eq!(f.notifier.scheduled_litter_pets(), vec![fine.id]);

        let stored = f.env.repository.get_pet(failing.id).await.unwrap().unwrap();
        assert_eq!(stored.last_litter_reminder_sent_on, NaiveDate::from_ymd_opt(2026, 3, 1));

        for hour in [9, 10] {
            let again = f.service.run(at(2026, 3, 1, hour)).await.unwrap();
            assert!(again
                .outcomes
                .iter()
                .all(|o| o.state == LitterReminderState::AlreadySentToday));
        }
        assert_eq!(f.notifier.litter_attempts_for(failing.id), 1);
        assert_eq!(f.notifier.litter_attempts_for(fine.id), 1);
    }
}
