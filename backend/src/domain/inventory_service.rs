//! Household supply stock.

use chrono::{DateTime, Utc};
use log::debug;
use shared::{InventoryItem, InventoryType, DEFAULT_INVENTORY_UNIT};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{MeadowError, Result};
use crate::storage::InventoryStorage;

#[derive(Clone)]
pub struct InventoryService<S> {
    repository: Arc<S>,
}

impl<S: InventoryStorage> InventoryService<S> {
    pub fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<InventoryItem>> {
        self.repository.list_inventory_items().await
    }

    pub async fn create(
        &self,
        item_type: InventoryType,
        name: &str,
        quantity: f64,
        unit: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<InventoryItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MeadowError::validation("Inventory item name cannot be empty"));
        }
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(MeadowError::validation("Quantity cannot be negative"));
        }

        let mut item = InventoryItem::new(item_type, name, quantity, now);
        item.unit = unit
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_INVENTORY_UNIT)
            .to_string();
        self.repository.store_inventory_item(&item).await?;
        Ok(item)
    }

    /// Add `delta` (negative to use up stock). Quantity never drops below zero.
    pub async fn adjust_quantity(&self, item_id: Uuid, delta: f64, now: DateTime<Utc>) -> Result<InventoryItem> {
        if !delta.is_finite() {
            return Err(MeadowError::validation("Quantity change must be a finite number"));
        }
        let mut item = self
            .repository
            .get_inventory_item(item_id)
            .await?
            .ok_or(MeadowError::NotFound {
                entity: "inventory item",
                id: item_id,
            })?;

        item.quantity = (item.quantity + delta).max(0.0);
        item.updated_at = now;
        self.repository.update_inventory_item(&item).await?;

        debug!("{} now at {}", item.name, item.formatted_quantity());
        Ok(item)
    }

    pub async fn delete(&self, item_id: Uuid) -> Result<bool> {
        self.repository.delete_inventory_item(item_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{utc, TestEnvironment};

    #[tokio::test]
    async fn test_adjust_clamps_at_zero_and_bumps_timestamp() {
        let env = TestEnvironment::new().await;
        let service = InventoryService::new(env.repository.clone());
        let item = service
            .create(InventoryType::Litter, "Clay litter", 2.0, None, utc(2026, 1, 1, 9, 0))
            .await
            .unwrap();
        assert_eq!(item.unit, "kg");

        let added = service.adjust_quantity(item.id, 1.5, utc(2026, 1, 2, 9, 0)).await.unwrap();
        assert_eq!(added.quantity, 3.5);
        assert_eq!(added.updated_at, utc(2026, 1, 2, 9, 0));

        let emptied = service.adjust_quantity(item.id, -10.0, utc(2026, 1, 3, 9, 0)).await.unwrap();
        assert_eq!(emptied.quantity, 0.0);
        assert_eq!(service.list().await.unwrap(), vec![emptied]);
    }

    #[tokio::test]
    async fn test_create_validation_and_delete() {
        let env = TestEnvironment::new().await;
        let service = InventoryService::new(env.repository.clone());
        let now = utc(2026, 1, 1, 9, 0);

        assert!(service.create(InventoryType::Food, "", 1.0, None, now).await.is_err());
        assert!(service.create(InventoryType::Food, "Kibble", -1.0, None, now).await.is_err());

        let cans = service
            .create(InventoryType::Food, "Wet food", 12.0, Some("cans"), now)
            .await
            .unwrap();
        assert_eq!(cans.formatted_quantity(), "12.0 cans");
        assert!(service.delete(cans.id).await.unwrap());
        assert!(matches!(
            service.adjust_quantity(cans.id, 1.0, now).await,
            Err(MeadowError::NotFound { .. })
        ));
    }
}
