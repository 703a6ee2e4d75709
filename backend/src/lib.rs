//! # Meadow Backend
//!
//! Everything below the UI of the Meadow pet-care tracker.
//!
//! ## Architecture
//!
//! ```text
//! Host UI
//!     ↓
//! Domain services (pets, profile, reminders, stats, ...)
//!     ↓                      ↘
//! Storage (SQLite)        IO contracts (notifications, purchases)
//! ```
//!
//! The host resolves a [`BackendConfig`], supplies its notification and
//! purchase implementations, and calls [`initialize_backend`] once. The
//! returned [`AppState`] holds every service, all sharing one database
//! connection.

pub mod config;
pub mod domain;
pub mod errors;
pub mod io;
pub mod logging;
pub mod storage;

use anyhow::Result;
use log::info;
use std::sync::Arc;

pub use config::BackendConfig;
pub use errors::MeadowError;

use domain::{
    ActivityService, InventoryService, LitterReminderService, NecessityService, PetService, ProfileService,
    StatsService, SubscriptionService,
};
use io::{EntitlementProvider, NotificationScheduler};
use storage::{DbConnection, SqliteRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub pet_service: PetService<SqliteRepository>,
    pub profile_service: ProfileService<SqliteRepository>,
    pub litter_reminder_service: LitterReminderService<SqliteRepository>,
    pub subscription_service: SubscriptionService<SqliteRepository>,
    pub stats_service: StatsService<SqliteRepository>,
    pub activity_service: ActivityService<SqliteRepository>,
    pub necessity_service: NecessityService<SqliteRepository>,
    pub inventory_service: InventoryService<SqliteRepository>,
    /// Direct repository access for plain CRUD the services do not wrap
    pub repository: Arc<SqliteRepository>,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(
    config: &BackendConfig,
    notifier: Arc<dyn NotificationScheduler>,
    entitlements: Arc<dyn EntitlementProvider>,
) -> Result<AppState> {
    info!("Setting up database");
    let db_conn = DbConnection::init(config).await?;
    let repository = Arc::new(SqliteRepository::new(db_conn));

    info!("Setting up domain services");
    let litter_reminder_service = LitterReminderService::new(repository.clone(), notifier.clone());
    let profile_service = ProfileService::new(repository.clone(), notifier.clone(), litter_reminder_service.clone());

    let app_state = AppState {
        pet_service: PetService::new(repository.clone(), notifier),
        profile_service,
        litter_reminder_service,
        subscription_service: SubscriptionService::new(repository.clone(), entitlements),
        stats_service: StatsService::new(repository.clone()),
        activity_service: ActivityService::new(repository.clone()),
        necessity_service: NecessityService::new(repository.clone()),
        inventory_service: InventoryService::new(repository.clone()),
        repository,
    };

    info!("Backend ready, data in {}", config.data_directory.display());
    Ok(app_state)
}
