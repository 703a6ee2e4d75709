use async_trait::async_trait;
use log::info;
use shared::UserProfile;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{
    decode_optional_timestamp, decode_timestamp, decode_u32, decode_uuid, encode_optional_timestamp,
    encode_timestamp, SqliteRepository,
};
use crate::errors::{MeadowError, Result};
use crate::storage::traits::UserProfileStorage;

const ENTITY: &str = "user profile";

fn profile_from_row(row: &SqliteRow) -> Result<UserProfile> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(UserProfile {
        id: decode_uuid(ENTITY, &id)?,
        name: row.try_get("name")?,
        created_at: decode_timestamp(ENTITY, &created_at)?,
        trial_start_date: decode_optional_timestamp(ENTITY, row.try_get("trial_start_date")?)?,
        is_premium: row.try_get("is_premium")?,
        premium_expires_at: decode_optional_timestamp(ENTITY, row.try_get("premium_expires_at")?)?,
        locale: row.try_get("locale")?,
        notifications_enabled: row.try_get("notifications_enabled")?,
        litter_reminders_enabled: row.try_get("litter_reminders_enabled")?,
        litter_reminder_hour: decode_u32(ENTITY, "litter_reminder_hour", row.try_get("litter_reminder_hour")?)?,
        litter_reminder_minute: decode_u32(ENTITY, "litter_reminder_minute", row.try_get("litter_reminder_minute")?)?,
        litter_reminder_threshold_days: decode_u32(
            ENTITY,
            "litter_reminder_threshold_days",
            row.try_get("litter_reminder_threshold_days")?,
        )?,
        playful_emoji_enabled: row.try_get("playful_emoji_enabled")?,
        default_food_kcal_per_100g: row.try_get("default_food_kcal_per_100g")?,
    })
}

#[async_trait]
impl UserProfileStorage for SqliteRepository {
    async fn get_profile(&self) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, trial_start_date, is_premium, premium_expires_at, locale,
                   notifications_enabled, litter_reminders_enabled, litter_reminder_hour,
                   litter_reminder_minute, litter_reminder_threshold_days, playful_emoji_enabled,
                   default_food_kcal_per_100g
            FROM user_profiles
            LIMIT 1
            "#,
        )
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, name, created_at, trial_start_date, is_premium, premium_expires_at,
                                       locale, notifications_enabled, litter_reminders_enabled,
                                       litter_reminder_hour, litter_reminder_minute,
                                       litter_reminder_threshold_days, playful_emoji_enabled,
                                       default_food_kcal_per_100g)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.id.to_string())
        .bind(&profile.name)
        .bind(encode_timestamp(&profile.created_at))
        .bind(encode_optional_timestamp(&profile.trial_start_date))
        .bind(profile.is_premium)
        .bind(encode_optional_timestamp(&profile.premium_expires_at))
        .bind(&profile.locale)
        .bind(profile.notifications_enabled)
        .bind(profile.litter_reminders_enabled)
        .bind(i64::from(profile.litter_reminder_hour))
        .bind(i64::from(profile.litter_reminder_minute))
        .bind(i64::from(profile.litter_reminder_threshold_days))
        .bind(profile.playful_emoji_enabled)
        .bind(profile.default_food_kcal_per_100g)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Stored user profile {}", profile.id);
        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET name = ?, created_at = ?, trial_start_date = ?, is_premium = ?, premium_expires_at = ?,
                locale = ?, notifications_enabled = ?, litter_reminders_enabled = ?,
                litter_reminder_hour = ?, litter_reminder_minute = ?, litter_reminder_threshold_days = ?,
                playful_emoji_enabled = ?, default_food_kcal_per_100g = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.name)
        .bind(encode_timestamp(&profile.created_at))
        .bind(encode_optional_timestamp(&profile.trial_start_date))
        .bind(profile.is_premium)
        .bind(encode_optional_timestamp(&profile.premium_expires_at))
        .bind(&profile.locale)
        .bind(profile.notifications_enabled)
        .bind(profile.litter_reminders_enabled)
        .bind(i64::from(profile.litter_reminder_hour))
        .bind(i64::from(profile.litter_reminder_minute))
        .bind(i64::from(profile.litter_reminder_threshold_days))
        .bind(profile.playful_emoji_enabled)
        .bind(profile.default_food_kcal_per_100g)
        .bind(profile.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MeadowError::NotFound { entity: ENTITY, id: profile.id });
        }
        tx.commit().await?;
        Ok(())
    }
}
