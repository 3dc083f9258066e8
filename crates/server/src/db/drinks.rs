//! Drink repository: the stock ledger.
//!
//! Stock mutations are single conditional `UPDATE` statements so the
//! database serializes them per row. `try_decrement_by_canonical` is the
//! check-and-decrement used on every order: of two concurrent orders for
//! the last unit, exactly one matches `stock_count > 0` and wins; the other
//! sees zero rows and is rejected as out of stock. The counter can never
//! go negative.

use sqlx::PgPool;

use lastcall_core::DrinkId;

use super::RepositoryError;

/// One row of the `drinks` table.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct StockRecord {
    pub id: DrinkId,
    pub canonical_id: String,
    pub display_name: String,
    pub stock_count: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

const RECORD_COLUMNS: &str = "id, canonical_id, display_name, stock_count, description, image_url";

/// Repository for drink/stock database operations.
pub struct DrinkRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DrinkRepository<'a> {
    /// Create a new drink repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All drinks with stock counts, ordered by display name for the menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_menu(&self) -> Result<Vec<StockRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, StockRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM drinks ORDER BY display_name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    /// Look up a drink by canonical id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_canonical(
        &self,
        canonical_id: &str,
    ) -> Result<Option<StockRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, StockRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM drinks WHERE canonical_id = $1"
        ))
        .bind(canonical_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// Atomically take one unit of stock for an order.
    ///
    /// Returns the updated record, or `None` when the drink is unknown or
    /// already depleted; the caller treats both as sold out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn try_decrement_by_canonical(
        &self,
        canonical_id: &str,
    ) -> Result<Option<StockRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, StockRecord>(&format!(
            "UPDATE drinks
                SET stock_count = stock_count - 1
              WHERE canonical_id = $1 AND stock_count > 0
          RETURNING {RECORD_COLUMNS}"
        ))
        .bind(canonical_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// Adjust stock by a delta (possibly negative), flooring at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the drink does not exist,
    /// `RepositoryError::Database` if the query fails.
    pub async fn adjust_delta(
        &self,
        id: DrinkId,
        delta: i32,
    ) -> Result<StockRecord, RepositoryError> {
        sqlx::query_as::<_, StockRecord>(&format!(
            "UPDATE drinks
                SET stock_count = GREATEST(stock_count + $2, 0)
              WHERE id = $1
          RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set stock to an absolute value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidValue` for negative values,
    /// `RepositoryError::NotFound` if the drink does not exist.
    pub async fn set_absolute(
        &self,
        id: DrinkId,
        value: i32,
    ) -> Result<StockRecord, RepositoryError> {
        if value < 0 {
            return Err(RepositoryError::InvalidValue(format!(
                "stock count cannot be negative (got {value})"
            )));
        }
        sqlx::query_as::<_, StockRecord>(&format!(
            "UPDATE drinks SET stock_count = $2 WHERE id = $1 RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .bind(value)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Idempotent seed upsert keyed by canonical id.
    ///
    /// Existing rows keep their stock count; only the display name is
    /// refreshed, so re-seeding never resets inventory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        canonical_id: &str,
        display_name: &str,
    ) -> Result<StockRecord, RepositoryError> {
        let record = sqlx::query_as::<_, StockRecord>(&format!(
            "INSERT INTO drinks (canonical_id, display_name)
             VALUES ($1, $2)
             ON CONFLICT (canonical_id) DO UPDATE
                SET display_name = EXCLUDED.display_name
          RETURNING {RECORD_COLUMNS}"
        ))
        .bind(canonical_id)
        .bind(display_name)
        .fetch_one(self.pool)
        .await?;
        Ok(record)
    }

    /// Create a new drink with an initial stock count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the canonical id is taken,
    /// `RepositoryError::InvalidValue` for negative initial stock.
    pub async fn create(
        &self,
        canonical_id: &str,
        display_name: &str,
        initial_stock: i32,
    ) -> Result<StockRecord, RepositoryError> {
        if initial_stock < 0 {
            return Err(RepositoryError::InvalidValue(format!(
                "initial stock cannot be negative (got {initial_stock})"
            )));
        }
        let result = sqlx::query_as::<_, StockRecord>(&format!(
            "INSERT INTO drinks (canonical_id, display_name, stock_count)
             VALUES ($1, $2, $3)
          RETURNING {RECORD_COLUMNS}"
        ))
        .bind(canonical_id)
        .bind(display_name)
        .bind(initial_stock)
        .fetch_one(self.pool)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                RepositoryError::Conflict(format!("drink already exists: {canonical_id}")),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a drink from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the drink does not exist.
    pub async fn delete(&self, id: DrinkId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
