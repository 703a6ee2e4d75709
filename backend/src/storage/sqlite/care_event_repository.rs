use async_trait::async_trait;
use log::{debug, warn};
use shared::{CareEvent, CareEventKind, CareEventType, DateRange, FeedingDetails};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{decode_optional_uuid, decode_timestamp, decode_u32, decode_uuid, encode_timestamp, SqliteRepository};
use crate::errors::{MeadowError, Result};
use crate::storage::traits::CareEventStorage;

const ENTITY: &str = "care event";

const EVENT_COLUMNS: &str = "id, pet_id, event_type, date, notes, metadata, is_special_food, food_grams, \
     food_flavor, duration_minutes";

/// Variant payload flattened into nullable columns
struct KindColumns {
    is_special_food: Option<bool>,
    food_grams: Option<f64>,
    food_flavor: Option<String>,
    duration_minutes: Option<i64>,
}

impl KindColumns {
    fn from_kind(kind: &CareEventKind) -> Self {
        let mut columns = KindColumns {
            is_special_food: None,
            food_grams: None,
            food_flavor: None,
            duration_minutes: None,
        };
        match kind {
            CareEventKind::Feeding(details) => {
                columns.is_special_food = details.is_special_food;
                columns.food_grams = details.food_grams;
                columns.food_flavor = details.food_flavor.clone();
            }
            CareEventKind::Walk { duration_minutes } => {
                columns.duration_minutes = duration_minutes.map(i64::from);
            }
            _ => {}
        }
        columns
    }
}

fn event_from_row(row: &SqliteRow) -> Result<CareEvent> {
    let id: String = row.try_get("id")?;
    let tag: String = row.try_get("event_type")?;
    let date: String = row.try_get("date")?;

    let event_type = CareEventType::from_tag(&tag).unwrap_or_else(|| {
        warn!("Unknown care event type '{}' on event {}, reading it as custom", tag, id);
        CareEventType::Custom
    });

    let kind = match event_type {
        CareEventType::Feeding => CareEventKind::Feeding(FeedingDetails {
            is_special_food: row.try_get("is_special_food")?,
            food_grams: row.try_get("food_grams")?,
            food_flavor: row.try_get("food_flavor")?,
        }),
        CareEventType::Walk => {
            let minutes: Option<i64> = row.try_get("duration_minutes")?;
            CareEventKind::Walk {
                duration_minutes: minutes
                    .map(|m| decode_u32(ENTITY, "duration_minutes", m))
                    .transpose()?,
            }
        }
        other => CareEventKind::bare(other),
    };

    Ok(CareEvent {
        id: decode_uuid(ENTITY, &id)?,
        pet_id: decode_optional_uuid(ENTITY, row.try_get("pet_id")?)?,
        kind,
        date: decode_timestamp(ENTITY, &date)?,
        notes: row.try_get("notes")?,
        metadata: row.try_get("metadata")?,
    })
}

fn validate_event(event: &CareEvent) -> Result<()> {
    if let Some(metadata) = &event.metadata {
        serde_json::from_str::<serde_json::Value>(metadata)
            .map_err(|e| MeadowError::validation(format!("Event metadata must be JSON: {}", e)))?;
    }
    if let Some(grams) = event.food_grams() {
        if !grams.is_finite() || grams < 0.0 {
            return Err(MeadowError::validation("Food grams cannot be negative"));
        }
    }
    Ok(())
}

#[async_trait]
impl CareEventStorage for SqliteRepository {
    async fn list_events(&self) -> Result<Vec<CareEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM care_events ORDER BY date DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<CareEvent>> {
        let row = sqlx::query(&format!("SELECT {} FROM care_events WHERE id = ?", EVENT_COLUMNS))
            .bind(event_id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn list_events_for_pet(&self, pet_id: Uuid) -> Result<Vec<CareEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM care_events WHERE pet_id = ? ORDER BY date DESC",
            EVENT_COLUMNS
        ))
        .bind(pet_id.to_string())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn list_events_in_range(&self, range: &DateRange) -> Result<Vec<CareEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM care_events WHERE date >= ? AND date <= ? ORDER BY date DESC",
            EVENT_COLUMNS
        ))
        .bind(encode_timestamp(&range.start))
        .bind(encode_timestamp(&range.end))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn list_events_for_pet_in_range(&self, pet_id: Uuid, range: &DateRange) -> Result<Vec<CareEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM care_events WHERE pet_id = ? AND date >= ? AND date <= ? ORDER BY date DESC",
            EVENT_COLUMNS
        ))
        .bind(pet_id.to_string())
        .bind(encode_timestamp(&range.start))
        .bind(encode_timestamp(&range.end))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn store_event(&self, event: &CareEvent) -> Result<()> {
        validate_event(event)?;
        let columns = KindColumns::from_kind(&event.kind);

        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO care_events (id, pet_id, event_type, date, notes, metadata,
                                     is_special_food, food_grams, food_flavor, duration_minutes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.pet_id.map(|id| id.to_string()))
        .bind(event.event_type().tag())
        .bind(encode_timestamp(&event.date))
        .bind(&event.notes)
        .bind(&event.metadata)
        .bind(columns.is_special_food)
        .bind(columns.food_grams)
        .bind(columns.food_flavor)
        .bind(columns.duration_minutes)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!("Stored {} event {}", event.event_type().tag(), event.id);
        Ok(())
    }

    async fn update_event(&self, event: &CareEvent) -> Result<()> {
        validate_event(event)?;
        let columns = KindColumns::from_kind(&event.kind);

        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE care_events
            SET pet_id = ?, event_type = ?, date = ?, notes = ?, metadata = ?,
                is_special_food = ?, food_grams = ?, food_flavor = ?, duration_minutes = ?
            WHERE id = ?
            "#,
        )
        .bind(event.pet_id.map(|id| id.to_string()))
        .bind(event.event_type().tag())
        .bind(encode_timestamp(&event.date))
        .bind(&event.notes)
        .bind(&event.metadata)
        .bind(columns.is_special_food)
        .bind(columns.food_grams)
        .bind(columns.food_flavor)
        .bind(columns.duration_minutes)
        .bind(event.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MeadowError::NotFound { entity: ENTITY, id: event.id });
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query("DELETE FROM care_events WHERE id = ?")
            .bind(event_id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
