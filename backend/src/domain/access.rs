//! Premium gating for statistics history.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use shared::{DateRange, UserProfile};

const ALL_TIME_MONTHS: u32 = 120;

/// Selectable statistics windows, each ending at "now"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsRange {
    Week,
    TwoWeeks,
    #[default]
    Month,
    ThreeMonths,
    SixMonths,
    Year,
    AllTime,
}

impl StatsRange {
    pub const ALL: [StatsRange; 7] = [
        StatsRange::Week,
        StatsRange::TwoWeeks,
        StatsRange::Month,
        StatsRange::ThreeMonths,
        StatsRange::SixMonths,
        StatsRange::Year,
        StatsRange::AllTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatsRange::Week => "Last 7 Days",
            StatsRange::TwoWeeks => "Last 15 Days",
            StatsRange::Month => "Last 30 Days",
            StatsRange::ThreeMonths => "Last 3 Months",
            StatsRange::SixMonths => "Last 6 Months",
            StatsRange::Year => "Last Year",
            StatsRange::AllTime => "All Time",
        }
    }

    /// Window length, None for all time
    pub fn days(&self) -> Option<i64> {
        match self {
            StatsRange::Week => Some(7),
            StatsRange::TwoWeeks => Some(15),
            StatsRange::Month => Some(30),
            StatsRange::ThreeMonths => Some(90),
            StatsRange::SixMonths => Some(180),
            StatsRange::Year => Some(365),
            StatsRange::AllTime => None,
        }
    }

    /// Ranges open to everyone regardless of subscription
    pub fn is_free(&self) -> bool {
        matches!(self, StatsRange::Week | StatsRange::TwoWeeks | StatsRange::Month)
    }

    /// `[now - days, now]`; all time reaches ten years back
    pub fn date_range(&self, now: DateTime<Utc>) -> DateRange {
        let start = match self.days() {
            Some(days) => now - Duration::days(days),
            None => now
                .checked_sub_months(Months::new(ALL_TIME_MONTHS))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        };
        DateRange::new(start, now)
    }
}

/// Whether viewing `range` needs premium access that `profile` does not have
pub fn requires_premium(range: StatsRange, profile: Option<&UserProfile>, now: DateTime<Utc>) -> bool {
    if range.is_free() {
        return false;
    }
    match profile {
        Some(profile) => !profile.can_access_premium_features(now),
        None => true,
    }
}
