//! Statistics over a selectable time window, gated by premium access.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::{CareEvent, CareEventType, DateRange, Expense, ExpenseCategory};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::access::{requires_premium, StatsRange};
use crate::errors::Result;
use crate::storage::{CareEventStorage, ExpenseStorage, UserProfileStorage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsData {
    pub range: DateRange,
    pub expenses: Vec<Expense>,
    pub events: Vec<CareEvent>,
    pub total_spent: f64,
}

impl StatsData {
    /// Spending per category, categories without spending omitted
    pub fn spending_by_category(&self) -> Vec<(ExpenseCategory, f64)> {
        ExpenseCategory::ALL
            .into_iter()
            .map(|category| {
                let total = self
                    .expenses
                    .iter()
                    .filter(|e| e.category == category)
                    .map(|e| e.amount)
                    .sum::<f64>();
                (category, total)
            })
            .filter(|(_, total)| *total > 0.0)
            .collect()
    }

    /// Event count per type, types without events omitted
    pub fn event_counts(&self) -> Vec<(CareEventType, usize)> {
        CareEventType::ALL
            .into_iter()
            .map(|event_type| {
                let count = self.events.iter().filter(|e| e.event_type() == event_type).count();
                (event_type, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatsView {
    PaywallRequired,
    Loaded(StatsData),
}

#[derive(Clone)]
pub struct StatsService<S> {
    repository: Arc<S>,
}

impl<S> StatsService<S>
where
    S: ExpenseStorage + CareEventStorage + UserProfileStorage,
{
    pub fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    /// Load expenses and events for `range` ending at `now`.
    ///
    /// With a pet filter only that pet's records are loaded; without one,
    /// every record in the window, pets and household alike.
    pub async fn load(&self, range: StatsRange, pet_id: Option<Uuid>, now: DateTime<Utc>) -> Result<StatsView> {
        let profile = self.repository.get_profile().await?;
        if requires_premium(range, profile.as_ref(), now) {
            debug!("{} requires premium", range.label());
            return Ok(StatsView::PaywallRequired);
        }

        let window = range.date_range(now);
        let (expenses, events) = match pet_id {
            Some(pet_id) => (
                self.repository.list_expenses_for_in_range(Some(pet_id), &window).await?,
                self.repository.list_events_for_pet_in_range(pet_id, &window).await?,
            ),
            None => (
                self.repository.list_expenses_in_range(&window).await?,
                self.repository.list_events_in_range(&window).await?,
            ),
        };
        let total_spent = expenses.iter().map(|e| e.amount).sum();

        info!(
            "Loaded stats for {}: {} expenses, {} events",
            range.label(),
            expenses.len(),
            events.len()
        );
        Ok(StatsView::Loaded(StatsData {
            range: window,
            expenses,
            events,
            total_spent,
        }))
    }
}
