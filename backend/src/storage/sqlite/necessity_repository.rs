use async_trait::async_trait;
use shared::NecessityItem;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::expense_repository::decode_category;
use super::{
    decode_optional_timestamp, decode_optional_uuid, decode_timestamp, decode_uuid, encode_optional_timestamp,
    encode_timestamp, SqliteRepository,
};
use crate::errors::{MeadowError, Result};
use crate::storage::traits::NecessityStorage;

const ENTITY: &str = "necessity item";

const NECESSITY_COLUMNS: &str = "id, pet_id, title, category, is_done, created_at, due_date, linked_expense_id";

fn necessity_from_row(row: &SqliteRow) -> Result<NecessityItem> {
    let id: String = row.try_get("id")?;
    let category: String = row.try_get("category")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(NecessityItem {
        pet_id: decode_optional_uuid(ENTITY, row.try_get("pet_id")?)?,
        title: row.try_get("title")?,
        category: decode_category(&id, &category),
        is_done: row.try_get("is_done")?,
        created_at: decode_timestamp(ENTITY, &created_at)?,
        due_date: decode_optional_timestamp(ENTITY, row.try_get("due_date")?)?,
        linked_expense_id: decode_optional_uuid(ENTITY, row.try_get("linked_expense_id")?)?,
        id: decode_uuid(ENTITY, &id)?,
    })
}

#[async_trait]
impl NecessityStorage for SqliteRepository {
    async fn list_necessities(&self) -> Result<Vec<NecessityItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM necessity_items ORDER BY created_at DESC",
            NECESSITY_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(necessity_from_row).collect()
    }

    async fn get_necessity(&self, item_id: Uuid) -> Result<Option<NecessityItem>> {
        let row = sqlx::query(&format!("SELECT {} FROM necessity_items WHERE id = ?", NECESSITY_COLUMNS))
            .bind(item_id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(necessity_from_row).transpose()
    }

    async fn list_necessities_for(&self, pet_id: Option<Uuid>) -> Result<Vec<NecessityItem>> {
        let rows = match pet_id {
            Some(pet_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM necessity_items WHERE pet_id = ? ORDER BY created_at DESC",
                    NECESSITY_COLUMNS
                ))
                .bind(pet_id.to_string())
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM necessity_items WHERE pet_id IS NULL ORDER BY created_at DESC",
                    NECESSITY_COLUMNS
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(necessity_from_row).collect()
    }

    async fn list_pending_necessities(&self) -> Result<Vec<NecessityItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM necessity_items WHERE is_done = FALSE ORDER BY created_at DESC",
            NECESSITY_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(necessity_from_row).collect()
    }

    async fn store_necessity(&self, item: &NecessityItem) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO necessity_items (id, pet_id, title, category, is_done, created_at, due_date, linked_expense_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.pet_id.map(|id| id.to_string()))
        .bind(&item.title)
        .bind(item.category.tag())
        .bind(item.is_done)
        .bind(encode_timestamp(&item.created_at))
        .bind(encode_optional_timestamp(&item.due_date))
        .bind(item.linked_expense_id.map(|id| id.to_string()))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_necessity(&self, item: &NecessityItem) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE necessity_items
            SET pet_id = ?, title = ?, category = ?, is_done = ?, created_at = ?, due_date = ?, linked_expense_id = ?
            WHERE id = ?
            "#,
        )
        .bind(item.pet_id.map(|id| id.to_string()))
        .bind(&item.title)
        .bind(item.category.tag())
        .bind(item.is_done)
        .bind(encode_timestamp(&item.created_at))
        .bind(encode_optional_timestamp(&item.due_date))
        .bind(item.linked_expense_id.map(|id| id.to_string()))
        .bind(item.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MeadowError::NotFound { entity: ENTITY, id: item.id });
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_necessity(&self, item_id: Uuid) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query("DELETE FROM necessity_items WHERE id = ?")
            .bind(item_id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
