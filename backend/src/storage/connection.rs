use anyhow::{Context, Result as AnyResult};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::errors::Result;

/// The persistence session: one SQLite pool holding exactly one connection.
///
/// Every repository operation goes through this single connection, so reads
/// and writes are serialized and there is only ever one writer. Build it once
/// at startup and hand clones to whoever needs storage.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if missing) the database file at `path` and ensure the schema exists
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open the database described by the backend configuration
    pub async fn init(config: &BackendConfig) -> AnyResult<Self> {
        if !config.data_directory.exists() {
            fs::create_dir_all(&config.data_directory).with_context(|| {
                format!("Failed to create data directory {:?}", config.data_directory)
            })?;
        }

        let database_path = config.database_path();
        info!("Opening database at {}", database_path.display());

        Self::open(&database_path)
            .await
            .with_context(|| format!("Failed to open database {}", database_path.display()))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // The singleton column makes a second profile row a constraint violation
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id TEXT PRIMARY KEY,
                singleton INTEGER NOT NULL DEFAULT 1 UNIQUE CHECK (singleton = 1),
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                trial_start_date TEXT,
                is_premium BOOLEAN NOT NULL DEFAULT FALSE,
                premium_expires_at TEXT,
                locale TEXT NOT NULL,
                notifications_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                litter_reminders_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                litter_reminder_hour INTEGER NOT NULL CHECK (litter_reminder_hour >= 0 AND litter_reminder_hour <= 23),
                litter_reminder_minute INTEGER NOT NULL CHECK (litter_reminder_minute >= 0 AND litter_reminder_minute <= 59),
                litter_reminder_threshold_days INTEGER NOT NULL CHECK (litter_reminder_threshold_days BETWEEN 1 AND 30),
                playful_emoji_enabled BOOLEAN NOT NULL DEFAULT TRUE,
                default_food_kcal_per_100g REAL NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                species TEXT NOT NULL,
                birth_date TEXT,
                photo_data BLOB,
                weight_kg REAL,
                height_cm REAL,
                created_at TEXT NOT NULL,
                last_litter_reminder_sent_at TEXT,
                last_litter_reminder_sent_on TEXT,
                food_kcal_per_100g REAL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_pets_created_at
            ON pets(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // Variant payload columns stay NULL for kinds that do not carry them
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS care_events (
                id TEXT PRIMARY KEY,
                pet_id TEXT,
                event_type TEXT NOT NULL,
                date TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                metadata TEXT,
                is_special_food BOOLEAN,
                food_grams REAL,
                food_flavor TEXT,
                duration_minutes INTEGER,
                FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_care_events_pet_date
            ON care_events(pet_id, date DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_care_events_date
            ON care_events(date DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                pet_id TEXT,
                amount REAL NOT NULL,
                currency TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                linked_event_id TEXT,
                FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_pet_date
            ON expenses(pet_id, date DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS necessity_items (
                id TEXT PRIMARY KEY,
                pet_id TEXT,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                is_done BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL,
                due_date TEXT,
                linked_expense_id TEXT,
                FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_necessity_items_pending
            ON necessity_items(is_done, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inventory_items (
                id TEXT PRIMARY KEY,
                item_type TEXT NOT NULL,
                name TEXT NOT NULL,
                quantity REAL NOT NULL,
                unit TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
