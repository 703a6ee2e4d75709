//! Recording doubles for the notification and purchase contracts.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::notifications::{NotificationScheduler, PermissionStatus};
use super::subscriptions::{EntitlementProvider, Product, PurchaseTransaction, PREMIUM_PRODUCT_IDS};
use crate::errors::{MeadowError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum NotifierCall {
    RequestPermission,
    ScheduleDaily { hour: u32, minute: u32 },
    CancelDaily,
    CheckPermission,
    ScheduleLitter {
        pet_id: Uuid,
        pet_name: String,
        hour: u32,
        minute: u32,
        playful: bool,
    },
    CancelLitter(Uuid),
    CancelAllLitter,
}

pub struct RecordingNotifier {
    grant_permission: bool,
    failing_pets: Mutex<HashSet<Uuid>>,
    litter_attempts: Mutex<Vec<Uuid>>,
    calls: Mutex<Vec<NotifierCall>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            grant_permission: true,
            failing_pets: Mutex::new(HashSet::new()),
            litter_attempts: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A notifier whose permission prompt is always declined
    pub fn denying() -> Self {
        Self {
            grant_permission: false,
            ..Self::new()
        }
    }

    /// Make scheduling a litter reminder for `pet_id` fail
    pub fn fail_for(&self, pet_id: Uuid) {
        self.failing_pets.lock().unwrap().insert(pet_id);
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Pet ids of successful litter schedule calls, in call order
    pub fn scheduled_litter_pets(&self) -> Vec<Uuid> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::ScheduleLitter { pet_id, .. } => Some(pet_id),
                _ => None,
            })
            .collect()
    }

    /// Litter schedule calls made for `pet_id`, failed ones included
    pub fn litter_attempts_for(&self, pet_id: Uuid) -> usize {
        self.litter_attempts.lock().unwrap().iter().filter(|id| **id == pet_id).count()
    }

    fn record(&self, call: NotifierCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NotificationScheduler for RecordingNotifier {
    async fn request_permission(&self) -> Result<bool> {
        self.record(NotifierCall::RequestPermission);
        Ok(self.grant_permission)
    }

    async fn schedule_daily_reminder(&self, hour: u32, minute: u32) -> Result<()> {
        self.record(NotifierCall::ScheduleDaily { hour, minute });
        Ok(())
    }

    async fn cancel_daily_reminder(&self) -> Result<()> {
        self.record(NotifierCall::CancelDaily);
        Ok(())
    }

    async fn check_permission_status(&self) -> Result<PermissionStatus> {
        self.record(NotifierCall::CheckPermission);
        Ok(if self.grant_permission {
            PermissionStatus::Authorized
        } else {
            PermissionStatus::Denied
        })
    }

    async fn schedule_litter_reminder(
        &self,
        pet_id: Uuid,
        pet_name: &str,
        hour: u32,
        minute: u32,
        playful: bool,
    ) -> Result<()> {
        self.litter_attempts.lock().unwrap().push(pet_id);
        if self.failing_pets.lock().unwrap().contains(&pet_id) {
            return Err(MeadowError::Notification(format!("scheduler refused {}", pet_id)));
        }
        self.record(NotifierCall::ScheduleLitter {
            pet_id,
            pet_name: pet_name.to_string(),
            hour,
            minute,
            playful,
        });
        Ok(())
    }

    async fn cancel_litter_reminder(&self, pet_id: Uuid) -> Result<()> {
        self.record(NotifierCall::CancelLitter(pet_id));
        Ok(())
    }

    async fn cancel_all_litter_reminders(&self) -> Result<()> {
        self.record(NotifierCall::CancelAllLitter);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PurchaseOutcome {
    Completed,
    Cancelled,
    Unverified,
}

pub struct FakeEntitlements {
    subscribed: Mutex<bool>,
    outcome: Mutex<PurchaseOutcome>,
    restore_calls: AtomicUsize,
}

impl FakeEntitlements {
    pub fn new(subscribed: bool) -> Self {
        Self {
            subscribed: Mutex::new(subscribed),
            outcome: Mutex::new(PurchaseOutcome::Completed),
            restore_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_outcome(&self, outcome: PurchaseOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn set_subscribed(&self, subscribed: bool) {
        *self.subscribed.lock().unwrap() = subscribed;
    }

    pub fn restore_calls(&self) -> usize {
        self.restore_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitlementProvider for FakeEntitlements {
    async fn load_products(&self) -> Result<Vec<Product>> {
        Ok(PREMIUM_PRODUCT_IDS
            .iter()
            .map(|id| Product {
                id: id.to_string(),
                display_name: "Meadow Premium".to_string(),
                display_price: "$2.99".to_string(),
            })
            .collect())
    }

    async fn purchase(&self, product: &Product) -> Result<Option<PurchaseTransaction>> {
        let outcome = *self.outcome.lock().unwrap();
        match outcome {
            PurchaseOutcome::Completed => {
                self.set_subscribed(true);
                let purchased_at = Utc::now();
                Ok(Some(PurchaseTransaction {
                    product_id: product.id.clone(),
                    purchased_at,
                    expires_at: Some(purchased_at + Duration::days(30)),
                }))
            }
            PurchaseOutcome::Cancelled => Ok(None),
            PurchaseOutcome::Unverified => Err(MeadowError::VerificationFailure(
                "transaction signature did not verify".to_string(),
            )),
        }
    }

    async fn restore_purchases(&self) -> Result<()> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn check_subscription_status(&self) -> bool {
        *self.subscribed.lock().unwrap()
    }
}
