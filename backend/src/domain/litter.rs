//! Litter reminder eligibility for a single pet.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{CareEvent, CareEventType, Pet};

/// Where a pet stands in one reminder run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitterReminderState {
    /// Not evaluated, or its events could not be read
    Unknown,
    Eligible,
    NotYetDue,
    AlreadySentToday,
}

/// Date of the newest litter event among `events`
pub fn last_litter_date(events: &[CareEvent]) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|event| event.event_type() == CareEventType::Litter)
        .map(|event| event.date)
        .max()
}

/// Decide whether `pet` should get a litter reminder.
///
/// `today` is the calendar day of `now` in the user's time zone; a reminder
/// already recorded for that day wins over everything else. Otherwise the pet
/// is eligible when it was never littered or the last clean is strictly older
/// than `threshold_days`. A threshold reaching past the representable calendar
/// is treated as not due.
pub fn evaluate_litter_reminder(
    pet: &Pet,
    last_litter: Option<DateTime<Utc>>,
    threshold_days: u32,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> LitterReminderState {
    if pet.last_litter_reminder_sent_on == Some(today) {
        return LitterReminderState::AlreadySentToday;
    }

    let Some(date) = last_litter else {
        return LitterReminderState::Eligible;
    };
    match now.checked_sub_signed(Duration::days(i64::from(threshold_days))) {
        Some(cutoff) if date < cutoff => LitterReminderState::Eligible,
        _ => LitterReminderState::NotYetDue,
    }
}
