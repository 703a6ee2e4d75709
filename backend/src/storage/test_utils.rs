/// Test utilities for repository and service tests.
///
/// The temporary directory holding the database is removed when the
/// environment is dropped, even if the test panics.
use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::DbConnection;
use super::sqlite::SqliteRepository;

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub database_path: PathBuf,
    pub repository: Arc<SqliteRepository>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let temp_dir = TempDir::with_prefix("meadow_test_").expect("Failed to create temp dir");
        let database_path = temp_dir.path().join("meadow.db");
        let connection = DbConnection::open(&database_path)
            .await
            .expect("Failed to open test database");

        Self {
            _temp_dir: temp_dir,
            database_path,
            repository: Arc::new(SqliteRepository::new(connection)),
        }
    }
}

/// UTC timestamp shorthand for fixtures
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}
