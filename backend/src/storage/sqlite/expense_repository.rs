use async_trait::async_trait;
use log::{debug, warn};
use shared::{DateRange, Expense, ExpenseCategory};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{decode_optional_uuid, decode_timestamp, decode_uuid, encode_timestamp, SqliteRepository};
use crate::errors::{MeadowError, Result};
use crate::storage::traits::ExpenseStorage;

const ENTITY: &str = "expense";

const EXPENSE_COLUMNS: &str = "id, pet_id, amount, currency, category, date, notes, linked_event_id";

pub(crate) fn decode_category(owner: &str, tag: &str) -> ExpenseCategory {
    ExpenseCategory::from_tag(tag).unwrap_or_else(|| {
        warn!("Unknown expense category '{}' on {}, reading it as other", tag, owner);
        ExpenseCategory::Other
    })
}

fn expense_from_row(row: &SqliteRow) -> Result<Expense> {
    let id: String = row.try_get("id")?;
    let category: String = row.try_get("category")?;
    let date: String = row.try_get("date")?;

    Ok(Expense {
        pet_id: decode_optional_uuid(ENTITY, row.try_get("pet_id")?)?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        category: decode_category(&id, &category),
        date: decode_timestamp(ENTITY, &date)?,
        notes: row.try_get("notes")?,
        linked_event_id: decode_optional_uuid(ENTITY, row.try_get("linked_event_id")?)?,
        id: decode_uuid(ENTITY, &id)?,
    })
}

/// Amounts are checked here because SQLite itself accepts any REAL
fn validate_expense(expense: &Expense) -> Result<()> {
    if !expense.amount.is_finite() {
        return Err(MeadowError::validation("Expense amount must be a finite number"));
    }
    if expense.amount < 0.0 {
        return Err(MeadowError::validation("Expense amount cannot be negative"));
    }
    if expense.currency.trim().is_empty() {
        return Err(MeadowError::validation("Expense currency cannot be empty"));
    }
    Ok(())
}

#[async_trait]
impl ExpenseStorage for SqliteRepository {
    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query(&format!("SELECT {} FROM expenses ORDER BY date DESC", EXPENSE_COLUMNS))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(expense_from_row).collect()
    }

    async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>> {
        let row = sqlx::query(&format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS))
            .bind(expense_id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(expense_from_row).transpose()
    }

    async fn list_expenses_for(&self, pet_id: Option<Uuid>) -> Result<Vec<Expense>> {
        let rows = match pet_id {
            Some(pet_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM expenses WHERE pet_id = ? ORDER BY date DESC",
                    EXPENSE_COLUMNS
                ))
                .bind(pet_id.to_string())
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM expenses WHERE pet_id IS NULL ORDER BY date DESC",
                    EXPENSE_COLUMNS
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(expense_from_row).collect()
    }

    async fn list_expenses_in_range(&self, range: &DateRange) -> Result<Vec<Expense>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM expenses WHERE date >= ? AND date <= ? ORDER BY date DESC",
            EXPENSE_COLUMNS
        ))
        .bind(encode_timestamp(&range.start))
        .bind(encode_timestamp(&range.end))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(expense_from_row).collect()
    }

    async fn list_expenses_for_in_range(&self, pet_id: Option<Uuid>, range: &DateRange) -> Result<Vec<Expense>> {
        let rows = match pet_id {
            Some(pet_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM expenses WHERE pet_id = ? AND date >= ? AND date <= ? ORDER BY date DESC",
                    EXPENSE_COLUMNS
                ))
                .bind(pet_id.to_string())
                .bind(encode_timestamp(&range.start))
                .bind(encode_timestamp(&range.end))
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM expenses WHERE pet_id IS NULL AND date >= ? AND date <= ? ORDER BY date DESC",
                    EXPENSE_COLUMNS
                ))
                .bind(encode_timestamp(&range.start))
                .bind(encode_timestamp(&range.end))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(expense_from_row).collect()
    }

    async fn store_expense(&self, expense: &Expense) -> Result<()> {
        validate_expense(expense)?;

        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO expenses (id, pet_id, amount, currency, category, date, notes, linked_event_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(expense.pet_id.map(|id| id.to_string()))
        .bind(expense.amount)
        .bind(&expense.currency)
        .bind(expense.category.tag())
        .bind(encode_timestamp(&expense.date))
        .bind(&expense.notes)
        .bind(expense.linked_event_id.map(|id| id.to_string()))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!("Stored expense {} of {}", expense.id, expense.formatted_amount());
        Ok(())
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        validate_expense(expense)?;

        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET pet_id = ?, amount = ?, currency = ?, category = ?, date = ?, notes = ?, linked_event_id = ?
            WHERE id = ?
            "#,
        )
        .bind(expense.pet_id.map(|id| id.to_string()))
        .bind(expense.amount)
        .bind(&expense.currency)
        .bind(expense.category.tag())
        .bind(encode_timestamp(&expense.date))
        .bind(&expense.notes)
        .bind(expense.linked_event_id.map(|id| id.to_string()))
        .bind(expense.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MeadowError::NotFound { entity: ENTITY, id: expense.id });
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_expense(&self, expense_id: Uuid) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(expense_id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
