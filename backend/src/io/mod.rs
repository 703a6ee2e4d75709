//! # IO Module
//!
//! Contracts for the collaborators the host platform provides: notification
//! delivery and in-app purchases. The backend never talks to a platform API
//! directly; the host hands in implementations of these traits at startup.

pub mod notifications;
pub mod subscriptions;

#[cfg(test)]
pub mod testing;

pub use notifications::{NotificationContent, NotificationScheduler, PermissionStatus};
pub use subscriptions::{EntitlementProvider, Product, PurchaseTransaction};
