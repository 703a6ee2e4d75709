//! # Domain Module
//!
//! Business rules for Meadow, independent of the storage engine and of the
//! host UI.
//!
//! ## Module Organization
//!
//! - **feeding**: two-day feeding guidance from weight and species
//! - **litter**: whether a pet is due a litter reminder
//! - **access**: premium gating of statistics ranges
//! - **litter_reminder_service**: the reminder run over all pets
//! - **\*_service**: the operations the UI calls, one service per area
//!
//! The pure computations take "now" as an argument and never read the clock.
//! Services are generic over the storage traits they need and receive the
//! notification and purchase contracts as trait objects.

pub mod access;
pub mod activity_service;
pub mod feeding;
pub mod inventory_service;
pub mod litter;
pub mod litter_reminder_service;
pub mod necessity_service;
pub mod pet_service;
pub mod profile_service;
pub mod stats_service;
pub mod subscription_service;

pub use access::{requires_premium, StatsRange};
pub use activity_service::{ActivityService, HomeSummary};
pub use feeding::FeedingGuidance;
pub use inventory_service::InventoryService;
pub use litter::{evaluate_litter_reminder, LitterReminderState};
pub use litter_reminder_service::{LitterReminderReport, LitterReminderService, PetReminderOutcome};
pub use necessity_service::NecessityService;
pub use pet_service::{CreatePetCommand, PetService};
pub use profile_service::{LitterSettings, ProfileService};
pub use stats_service::{StatsData, StatsService, StatsView};
pub use subscription_service::SubscriptionService;
