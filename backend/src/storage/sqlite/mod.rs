//! # SQLite Storage
//!
//! [`SqliteRepository`] implements every storage trait against one
//! [`DbConnection`]. Each entity family lives in its own file; the helpers
//! below convert between entity values and the text columns SQLite stores.
//!
//! Timestamps are stored as RFC 3339 UTC text with a fixed nanosecond
//! fraction, so string order equals time order and range filters can compare
//! the encoded values directly.

pub mod care_event_repository;
pub mod expense_repository;
pub mod inventory_repository;
pub mod necessity_repository;
pub mod pet_repository;
pub mod user_profile_repository;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::errors::{MeadowError, Result};
use crate::storage::connection::DbConnection;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository binding all entity families to one persistence session
#[derive(Clone)]
pub struct SqliteRepository {
    db: DbConnection,
}

impl SqliteRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DbConnection {
        &self.db
    }
}

pub(crate) fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn encode_optional_timestamp(value: &Option<DateTime<Utc>>) -> Option<String> {
    value.as_ref().map(encode_timestamp)
}

pub(crate) fn decode_timestamp(entity: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MeadowError::corrupt(entity, format!("bad timestamp '{}': {}", raw, e)))
}

pub(crate) fn decode_optional_timestamp(entity: &'static str, raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|r| decode_timestamp(entity, &r)).transpose()
}

pub(crate) fn encode_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn decode_optional_date(entity: &'static str, raw: Option<String>) -> Result<Option<NaiveDate>> {
    raw.map(|r| {
        NaiveDate::parse_from_str(&r, DATE_FORMAT)
            .map_err(|e| MeadowError::corrupt(entity, format!("bad date '{}': {}", r, e)))
    })
    .transpose()
}

pub(crate) fn decode_uuid(entity: &'static str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| MeadowError::corrupt(entity, format!("bad id '{}': {}", raw, e)))
}

pub(crate) fn decode_optional_uuid(entity: &'static str, raw: Option<String>) -> Result<Option<Uuid>> {
    raw.map(|r| decode_uuid(entity, &r)).transpose()
}

pub(crate) fn decode_u32(entity: &'static str, column: &str, raw: i64) -> Result<u32> {
    u32::try_from(raw).map_err(|_| MeadowError::corrupt(entity, format!("{} out of range: {}", column, raw)))
}
