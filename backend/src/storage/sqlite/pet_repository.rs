use async_trait::async_trait;
use log::{debug, info};
use shared::Pet;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{
    decode_optional_date, decode_optional_timestamp, decode_timestamp, decode_uuid, encode_date,
    encode_optional_timestamp, encode_timestamp, SqliteRepository,
};
use crate::errors::{MeadowError, Result};
use crate::storage::traits::PetStorage;

const ENTITY: &str = "pet";

const PET_COLUMNS: &str = "id, name, species, birth_date, photo_data, weight_kg, height_cm, created_at, \
     last_litter_reminder_sent_at, last_litter_reminder_sent_on, food_kcal_per_100g";

fn pet_from_row(row: &SqliteRow) -> Result<Pet> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Pet {
        id: decode_uuid(ENTITY, &id)?,
        name: row.try_get("name")?,
        species: row.try_get("species")?,
        birth_date: decode_optional_date(ENTITY, row.try_get("birth_date")?)?,
        photo_data: row.try_get("photo_data")?,
        weight_kg: row.try_get("weight_kg")?,
        height_cm: row.try_get("height_cm")?,
        created_at: decode_timestamp(ENTITY, &created_at)?,
        last_litter_reminder_sent_at: decode_optional_timestamp(ENTITY, row.try_get("last_litter_reminder_sent_at")?)?,
        last_litter_reminder_sent_on: decode_optional_date(ENTITY, row.try_get("last_litter_reminder_sent_on")?)?,
        food_kcal_per_100g: row.try_get("food_kcal_per_100g")?,
    })
}

#[async_trait]
impl PetStorage for SqliteRepository {
    async fn list_pets(&self) -> Result<Vec<Pet>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pets ORDER BY created_at DESC",
            PET_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(pet_from_row).collect()
    }

    async fn get_pet(&self, pet_id: Uuid) -> Result<Option<Pet>> {
        let row = sqlx::query(&format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS))
            .bind(pet_id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(pet_from_row).transpose()
    }

    async fn store_pet(&self, pet: &Pet) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO pets (id, name, species, birth_date, photo_data, weight_kg, height_cm, created_at,
                              last_litter_reminder_sent_at, last_litter_reminder_sent_on, food_kcal_per_100g)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(pet.id.to_string())
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(pet.birth_date.as_ref().map(encode_date))
        .bind(&pet.photo_data)
        .bind(pet.weight_kg)
        .bind(pet.height_cm)
        .bind(encode_timestamp(&pet.created_at))
        .bind(encode_optional_timestamp(&pet.last_litter_reminder_sent_at))
        .bind(pet.last_litter_reminder_sent_on.as_ref().map(encode_date))
        .bind(pet.food_kcal_per_100g)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!("Stored pet {} ({})", pet.name, pet.id);
        Ok(())
    }

    async fn update_pet(&self, pet: &Pet) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE pets
            SET name = ?, species = ?, birth_date = ?, photo_data = ?, weight_kg = ?, height_cm = ?,
                created_at = ?, last_litter_reminder_sent_at = ?, last_litter_reminder_sent_on = ?,
                food_kcal_per_100g = ?
            WHERE id = ?
            "#,
        )
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(pet.birth_date.as_ref().map(encode_date))
        .bind(&pet.photo_data)
        .bind(pet.weight_kg)
        .bind(pet.height_cm)
        .bind(encode_timestamp(&pet.created_at))
        .bind(encode_optional_timestamp(&pet.last_litter_reminder_sent_at))
        .bind(pet.last_litter_reminder_sent_on.as_ref().map(encode_date))
        .bind(pet.food_kcal_per_100g)
        .bind(pet.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MeadowError::NotFound { entity: ENTITY, id: pet.id });
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_pet(&self, pet_id: Uuid) -> Result<bool> {
        let id = pet_id.to_string();
        let mut tx = self.db.pool().begin().await?;

        // Owned records go in the same unit as the pet itself
        let events = sqlx::query("DELETE FROM care_events WHERE pet_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let expenses = sqlx::query("DELETE FROM expenses WHERE pet_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let necessities = sqlx::query("DELETE FROM necessity_items WHERE pet_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let pets = sqlx::query("DELETE FROM pets WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if pets > 0 {
            info!(
                "Deleted pet {} with {} events, {} expenses, {} necessities",
                pet_id, events, expenses, necessities
            );
        }
        Ok(pets > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{utc, TestEnvironment};
    use crate::storage::traits::{CareEventStorage, ExpenseStorage, NecessityStorage};
    use chrono::NaiveDate;
    use shared::{CareEvent, CareEventKind, Expense, ExpenseCategory, NecessityItem};

    fn sample_pet() -> Pet {
        let mut pet = Pet::new("Miso", "Cat", utc(2026, 1, 2, 9, 30));
        pet.birth_date = NaiveDate::from_ymd_opt(2021, 4, 1);
        pet.photo_data = Some(vec![0x89, 0x50, 0x4e, 0x47]);
        pet.weight_kg = Some(4.5);
        pet.food_kcal_per_100g = Some(380.0);
        pet
    }

    #[tokio::test]
    async fn test_store_and_get_pet_round_trip() {
        let env = TestEnvironment::new().await;
        let pet = sample_pet();

        env.repository.store_pet(&pet).await.expect("Failed to store pet");

        let loaded = env.repository.get_pet(pet.id).await.unwrap();
        assert_eq!(loaded, Some(pet));
    }

    #[tokio::test]
    async fn test_get_missing_pet_is_none() {
        let env = TestEnvironment::new().await;
        assert_eq!(env.repository.get_pet(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_pets_newest_first() {
        let env = TestEnvironment::new().await;
        let older = Pet::new("Old", "Dog", utc(2025, 5, 1, 8, 0));
        let newer = Pet::new("New", "Cat", utc(2026, 5, 1, 8, 0));
        env.repository.store_pet(&older).await.unwrap();
        env.repository.store_pet(&newer).await.unwrap();

        let names: Vec<String> = env.repository.list_pets().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_update_pet_persists_mutation() {
        let env = TestEnvironment::new().await;
        let mut pet = sample_pet();
        env.repository.store_pet(&pet).await.unwrap();

        pet.weight_kg = Some(5.1);
        pet.record_litter_reminder(utc(2026, 2, 1, 20, 0), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        env.repository.update_pet(&pet).await.unwrap();

        let loaded = env.repository.get_pet(pet.id).await.unwrap().unwrap();
        assert_eq!(loaded.weight_kg, Some(5.1));
        assert_eq!(loaded.last_litter_reminder_sent_on, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(loaded, pet);
    }

    #[tokio::test]
    async fn test_update_missing_pet_is_not_found() {
        let env = TestEnvironment::new().await;
        let result = env.repository.update_pet(&sample_pet()).await;
        assert!(matches!(result, Err(MeadowError::NotFound { entity: "pet", .. })));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_storage_failure() {
        let env = TestEnvironment::new().await;
        let pet = sample_pet();
        env.repository.store_pet(&pet).await.unwrap();

        let result = env.repository.store_pet(&pet).await;
        assert!(matches!(result, Err(MeadowError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn test_delete_pet_cascades_to_owned_records() {
        let env = TestEnvironment::new().await;
        let pet = sample_pet();
        env.repository.store_pet(&pet).await.unwrap();

        let event = CareEvent::new(CareEventKind::Litter, utc(2026, 2, 1, 8, 0)).for_pet(pet.id);
        let expense = Expense::new(20.0, ExpenseCategory::Vet, utc(2026, 2, 1, 8, 0)).for_pet(pet.id);
        let household = Expense::new(5.0, ExpenseCategory::Other, utc(2026, 2, 1, 8, 0));
        let necessity = NecessityItem::new("Flea drops", ExpenseCategory::Vet, utc(2026, 2, 1, 8, 0)).for_pet(pet.id);
        env.repository.store_event(&event).await.unwrap();
        env.repository.store_expense(&expense).await.unwrap();
        env.repository.store_expense(&household).await.unwrap();
        env.repository.store_necessity(&necessity).await.unwrap();

        assert!(env.repository.delete_pet(pet.id).await.unwrap());

        assert_eq!(env.repository.get_pet(pet.id).await.unwrap(), None);
        assert_eq!(env.repository.get_event(event.id).await.unwrap(), None);
        assert_eq!(env.repository.get_expense(expense.id).await.unwrap(), None);
        assert_eq!(env.repository.get_necessity(necessity.id).await.unwrap(), None);
        // Household expense is not owned by the pet
        assert!(env.repository.get_expense(household.id).await.unwrap().is_some());

        assert!(!env.repository.delete_pet(pet.id).await.unwrap());
    }
}
