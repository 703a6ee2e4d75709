//! # Storage Traits
//!
//! One access interface per entity family. The domain layer only sees these
//! traits; [`SqliteRepository`](super::SqliteRepository) implements all of
//! them over a single [`DbConnection`](super::DbConnection).
//!
//! Every store/update/delete is one atomic unit against the store. Lookups by
//! id return `Ok(None)` for a missing record; only updates of a missing record
//! fail, with `MeadowError::NotFound`.

use async_trait::async_trait;
use shared::{CareEvent, DateRange, Expense, InventoryItem, NecessityItem, Pet, UserProfile};
use uuid::Uuid;

use crate::errors::Result;

#[async_trait]
pub trait PetStorage: Send + Sync {
    /// All pets, newest first
    async fn list_pets(&self) -> Result<Vec<Pet>>;

    async fn get_pet(&self, pet_id: Uuid) -> Result<Option<Pet>>;

    async fn store_pet(&self, pet: &Pet) -> Result<()>;

    async fn update_pet(&self, pet: &Pet) -> Result<()>;

    /// Delete a pet together with its events, expenses and necessities.
    /// Returns false when no such pet existed.
    async fn delete_pet(&self, pet_id: Uuid) -> Result<bool>;
}

/// Care event queries. Every list is ordered by date descending and every
/// range is inclusive on both ends.
#[async_trait]
pub trait CareEventStorage: Send + Sync {
    async fn list_events(&self) -> Result<Vec<CareEvent>>;

    async fn get_event(&self, event_id: Uuid) -> Result<Option<CareEvent>>;

    async fn list_events_for_pet(&self, pet_id: Uuid) -> Result<Vec<CareEvent>>;

    async fn list_events_in_range(&self, range: &DateRange) -> Result<Vec<CareEvent>>;

    async fn list_events_for_pet_in_range(&self, pet_id: Uuid, range: &DateRange) -> Result<Vec<CareEvent>>;

    async fn store_event(&self, event: &CareEvent) -> Result<()>;

    async fn update_event(&self, event: &CareEvent) -> Result<()>;

    async fn delete_event(&self, event_id: Uuid) -> Result<bool>;
}

/// Expense queries, ordered by date descending.
///
/// A pet filter of `None` selects household expenses only, never "any pet".
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    async fn list_expenses(&self) -> Result<Vec<Expense>>;

    async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>>;

    async fn list_expenses_for(&self, pet_id: Option<Uuid>) -> Result<Vec<Expense>>;

    async fn list_expenses_in_range(&self, range: &DateRange) -> Result<Vec<Expense>>;

    async fn list_expenses_for_in_range(&self, pet_id: Option<Uuid>, range: &DateRange) -> Result<Vec<Expense>>;

    /// Rejects negative or non-finite amounts
    async fn store_expense(&self, expense: &Expense) -> Result<()>;

    /// Rejects negative or non-finite amounts
    async fn update_expense(&self, expense: &Expense) -> Result<()>;

    async fn delete_expense(&self, expense_id: Uuid) -> Result<bool>;

    /// Sum of all expense amounts in the inclusive range, across pets and household.
    ///
    /// Computed over the range query result rather than pushed down to the store.
    async fn total_amount(&self, range: &DateRange) -> Result<f64> {
        let expenses = self.list_expenses_in_range(range).await?;
        Ok(expenses.iter().map(|e| e.amount).sum())
    }
}

/// Necessity item queries, ordered by creation descending
#[async_trait]
pub trait NecessityStorage: Send + Sync {
    async fn list_necessities(&self) -> Result<Vec<NecessityItem>>;

    async fn get_necessity(&self, item_id: Uuid) -> Result<Option<NecessityItem>>;

    /// Items of one pet, or household items when `pet_id` is None
    async fn list_necessities_for(&self, pet_id: Option<Uuid>) -> Result<Vec<NecessityItem>>;

    /// Items not yet done, across pets and household
    async fn list_pending_necessities(&self) -> Result<Vec<NecessityItem>>;

    async fn store_necessity(&self, item: &NecessityItem) -> Result<()>;

    async fn update_necessity(&self, item: &NecessityItem) -> Result<()>;

    async fn delete_necessity(&self, item_id: Uuid) -> Result<bool>;
}

/// Inventory items, most recently updated first
#[async_trait]
pub trait InventoryStorage: Send + Sync {
    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>>;

    async fn get_inventory_item(&self, item_id: Uuid) -> Result<Option<InventoryItem>>;

    async fn store_inventory_item(&self, item: &InventoryItem) -> Result<()>;

    async fn update_inventory_item(&self, item: &InventoryItem) -> Result<()>;

    async fn delete_inventory_item(&self, item_id: Uuid) -> Result<bool>;
}

/// Access to the single user profile
#[async_trait]
pub trait UserProfileStorage: Send + Sync {
    async fn get_profile(&self) -> Result<Option<UserProfile>>;

    /// Fails with a storage error if a profile already exists
    async fn store_profile(&self, profile: &UserProfile) -> Result<()>;

    async fn update_profile(&self, profile: &UserProfile) -> Result<()>;
}
