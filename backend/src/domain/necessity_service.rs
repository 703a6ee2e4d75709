//! Shopping and to-do necessities, optionally closed with a purchase.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use shared::{Expense, ExpenseCategory, NecessityItem};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{MeadowError, Result};
use crate::storage::{ExpenseStorage, NecessityStorage};

const ENTITY: &str = "necessity item";

#[derive(Clone)]
pub struct NecessityService<S> {
    repository: Arc<S>,
}

impl<S> NecessityService<S>
where
    S: NecessityStorage + ExpenseStorage,
{
    pub fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        title: &str,
        category: ExpenseCategory,
        pet_id: Option<Uuid>,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<NecessityItem> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MeadowError::validation("Necessity title cannot be empty"));
        }

        let mut item = NecessityItem::new(title, category, now);
        item.pet_id = pet_id;
        item.due_date = due_date;
        self.repository.store_necessity(&item).await?;
        Ok(item)
    }

    pub async fn pending(&self) -> Result<Vec<NecessityItem>> {
        self.repository.list_pending_necessities().await
    }

    pub async fn toggle_done(&self, item_id: Uuid) -> Result<NecessityItem> {
        let mut item = self.require(item_id).await?;
        item.is_done = !item.is_done;
        self.repository.update_necessity(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, item_id: Uuid) -> Result<bool> {
        self.repository.delete_necessity(item_id).await
    }

    /// Mark the item done and record what it cost as a linked expense.
    ///
    /// The expense is written first. If marking the item fails afterwards,
    /// the expense is deleted again and the update error is returned.
    pub async fn complete_with_expense(
        &self,
        item_id: Uuid,
        amount: f64,
        date: DateTime<Utc>,
    ) -> Result<(NecessityItem, Expense)> {
        let mut item = self.require(item_id).await?;

        let mut expense = Expense::new(amount, item.category, date);
        expense.pet_id = item.pet_id;
        expense.notes = item.title.clone();
        self.repository.store_expense(&expense).await?;

        item.is_done = true;
        item.linked_expense_id = Some(expense.id);
        if let Err(update_error) = self.repository.update_necessity(&item).await {
            warn!("Completing {} failed, removing expense {}", item.id, expense.id);
            if let Err(e) = self.repository.delete_expense(expense.id).await {
                error!("Could not remove orphaned expense {}: {}", expense.id, e);
            }
            return Err(update_error);
        }

        info!("Completed {} with expense {}", item.id, expense.formatted_amount());
        Ok((item, expense))
    }

    async fn require(&self, item_id: Uuid) -> Result<NecessityItem> {
        self.repository
            .get_necessity(item_id)
            .await?
            .ok_or(MeadowError::NotFound { entity: ENTITY, id: item_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteRepository;
    use crate::storage::test_utils::{utc, TestEnvironment};
    use async_trait::async_trait;
    use shared::DateRange;

    #[tokio::test]
    async fn test_create_toggle_delete() {
        let env = TestEnvironment::new().await;
        let service = NecessityService::new(env.repository.clone());
        let now = utc(2026, 2, 1, 9, 0);

        assert!(service.create(" ", ExpenseCategory::Food, None, None, now).await.is_err());

        let item = service.create("Cat food", ExpenseCategory::Food, None, None, now).await.unwrap();
        assert_eq!(service.pending().await.unwrap(), vec![item.clone()]);

        assert!(service.toggle_done(item.id).await.unwrap().is_done);
        assert!(service.pending().await.unwrap().is_empty());
        assert!(!service.toggle_done(item.id).await.unwrap().is_done);

        assert!(service.delete(item.id).await.unwrap());
        assert!(matches!(
            service.toggle_done(item.id).await,
            Err(MeadowError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_with_expense_links_both() {
        let env = TestEnvironment::new().await;
        let service = NecessityService::new(env.repository.clone());
        let item = service
            .create("Litter bag", ExpenseCategory::Litter, None, None, utc(2026, 2, 1, 9, 0))
            .await
            .unwrap();

        let (done, expense) = service
            .complete_with_expense(item.id, 14.99, utc(2026, 2, 2, 9, 0))
            .await
            .unwrap();

        assert!(done.is_done);
        assert_eq!(done.linked_expense_id, Some(expense.id));
        assert_eq!(expense.category, ExpenseCategory::Litter);
        assert_eq!(expense.notes, "Litter bag");
        assert_eq!(env.repository.get_necessity(item.id).await.unwrap(), Some(done));
        assert_eq!(env.repository.get_expense(expense.id).await.unwrap(), Some(expense));
    }

    #[tokio::test]
    async fn test_invalid_amount_writes_nothing() {
        let env = TestEnvironment::new().await;
        let service = NecessityService::new(env.repository.clone());
        let item = service
            .create("Vet visit", ExpenseCategory::Vet, None, None, utc(2026, 2, 1, 9, 0))
            .await
            .unwrap();

        assert!(service.complete_with_expense(item.id, -3.0, utc(2026, 2, 2, 9, 0)).await.is_err());
        assert!(env.repository.list_expenses().await.unwrap().is_empty());
        assert!(!env.repository.get_necessity(item.id).await.unwrap().unwrap().is_done);
    }

    /// Delegates to SQLite but refuses necessity updates
    struct FailingUpdates(Arc<SqliteRepository>);

    #[async_trait]
    impl NecessityStorage for FailingUpdates {
        async fn list_necessities(&self) -> Result<Vec<NecessityItem>> {
            self.0.list_necessities().await
        }
        async fn get_necessity(&self, item_id: Uuid) -> Result<Option<NecessityItem>> {
            self.0.get_necessity(item_id).await
        }
        async fn list_necessities_for(&self, pet_id: Option<Uuid>) -> Result<Vec<NecessityItem>> {
            self.0.list_necessities_for(pet_id).await
        }
        async fn list_pending_necessities(&self) -> Result<Vec<NecessityItem>> {
            self.0.list_pending_necessities().await
        }
        async fn store_necessity(&self, item: &NecessityItem) -> Result<()> {
            self.0.store_necessity(item).await
        }
        async fn update_necessity(&self, _item: &NecessityItem) -> Result<()> {
            Err(MeadowError::StorageFailure(sqlx::Error::PoolClosed))
        }
        async fn delete_necessity(&self, item_id: Uuid) -> Result<bool> {
            self.0.delete_necessity(item_id).await
        }
    }

    #[async_trait]
    impl ExpenseStorage for FailingUpdates {
        async fn list_expenses(&self) -> Result<Vec<Expense>> {
            self.0.list_expenses().await
        }
        async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>> {
            self.0.get_expense(expense_id).await
        }
        async fn list_expenses_for(&self, pet_id: Option<Uuid>) -> Result<Vec<Expense>> {
            self.0.list_expenses_for(pet_id).await
        }
        async fn list_expenses_in_range(&self, range: &DateRange) -> Result<Vec<Expense>> {
            self.0.list_expenses_in_range(range).await
        }
        async fn list_expenses_for_in_range(&self, pet_id: Option<Uuid>, range: &DateRange) -> Result<Vec<Expense>> {
            self.0.list_expenses_for_in_range(pet_id, range).await
        }
        async fn store_expense(&self, expense: &Expense) -> Result<()> {
            self.0.store_expense(expense).await
        }
        async fn update_expense(&self, expense: &Expense) -> Result<()> {
            self.0.update_expense(expense).await
        }
        async fn delete_expense(&self, expense_id: Uuid) -> Result<bool> {
            self.0.delete_expense(expense_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_completion_removes_expense() {
        let env = TestEnvironment::new().await;
        let item = NecessityItem::new("Kibble", ExpenseCategory::Food, utc(2026, 2, 1, 9, 0));
        env.repository.store_necessity(&item).await.unwrap();

        let service = NecessityService::new(Arc::new(FailingUpdates(env.repository.clone())));
        assert!(matches!(
            service.complete_with_expense(item.id, 30.0, utc(2026, 2, 2, 9, 0)).await,
            Err(MeadowError::StorageFailure(_))
        ));

        assert!(env.repository.list_expenses().await.unwrap().is_empty());
        assert!(!env.repository.get_necessity(item.id).await.unwrap().unwrap().is_done);
    }
}
