use async_trait::async_trait;
use log::warn;
use shared::{InventoryItem, InventoryType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{decode_timestamp, decode_uuid, encode_timestamp, SqliteRepository};
use crate::errors::{MeadowError, Result};
use crate::storage::traits::InventoryStorage;

const ENTITY: &str = "inventory item";

const INVENTORY_COLUMNS: &str = "id, item_type, name, quantity, unit, updated_at";

fn inventory_item_from_row(row: &SqliteRow) -> Result<InventoryItem> {
    let id: String = row.try_get("id")?;
    let tag: String = row.try_get("item_type")?;
    let updated_at: String = row.try_get("updated_at")?;

    let item_type = InventoryType::from_tag(&tag).unwrap_or_else(|| {
        warn!("Unknown inventory type '{}' on item {}, reading it as other", tag, id);
        InventoryType::Other
    });

    Ok(InventoryItem {
        item_type,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        unit: row.try_get("unit")?,
        updated_at: decode_timestamp(ENTITY, &updated_at)?,
        id: decode_uuid(ENTITY, &id)?,
    })
}

#[async_trait]
impl InventoryStorage for SqliteRepository {
    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM inventory_items ORDER BY updated_at DESC",
            INVENTORY_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(inventory_item_from_row).collect()
    }

    async fn get_inventory_item(&self, item_id: Uuid) -> Result<Option<InventoryItem>> {
        let row = sqlx::query(&format!("SELECT {} FROM inventory_items WHERE id = ?", INVENTORY_COLUMNS))
            .bind(item_id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(inventory_item_from_row).transpose()
    }

    async fn store_inventory_item(&self, item: &InventoryItem) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO inventory_items (id, item_type, name, quantity, unit, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.item_type.tag())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(encode_timestamp(&item.updated_at))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_inventory_item(&self, item: &InventoryItem) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET item_type = ?, name = ?, quantity = ?, unit = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(item.item_type.tag())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(encode_timestamp(&item.updated_at))
        .bind(item.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MeadowError::NotFound { entity: ENTITY, id: item.id });
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_inventory_item(&self, item_id: Uuid) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?")
            .bind(item_id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
