//! Postgres-backed inventory store.
//!
//! One row per item in the `inventory` table; the primary key is the
//! normalized name and a CHECK constraint keeps quantities positive.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use stockroom_inventory::{InventoryItem, ItemName, Quantity};

use super::{InventoryStore, StoreError, parse_stored_key};

/// Postgres SQLSTATE for `insufficient_privilege`.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Postgres-backed inventory store.
///
/// Uses the SQLx connection pool, which is cheap to clone and thread-safe.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(map_sqlx)?;
        Ok(Self::new(pool))
    }

    /// Create the `inventory` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inventory (
                name       TEXT PRIMARY KEY,
                quantity   BIGINT NOT NULL CHECK (quantity > 0),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Network(err.to_string()),
        sqlx::Error::Database(db) if db.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) => {
            StoreError::PermissionDenied(db.message().to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn to_quantity(raw: i64) -> Result<Quantity, StoreError> {
    let raw = u64::try_from(raw).map_err(|_| StoreError::Decode(format!("negative quantity {raw}")))?;
    Quantity::new(raw).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode_row(name: &str, quantity: i64) -> Result<InventoryItem, StoreError> {
    Ok(InventoryItem::new(parse_stored_key(name)?, to_quantity(quantity)?))
}

fn to_column(quantity: Quantity) -> Result<i64, StoreError> {
    i64::try_from(quantity.get())
        .map_err(|_| StoreError::Backend(format!("quantity {quantity} exceeds BIGINT")))
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn list_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query("SELECT name, quantity FROM inventory")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name").map_err(map_sqlx)?;
            let quantity: i64 = row.try_get("quantity").map_err(map_sqlx)?;
            match decode_row(&name, quantity) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(row = %name, error = %err, "skipping malformed inventory row");
                }
            }
        }
        Ok(items)
    }

    async fn get_quantity(&self, name: &ItemName) -> Result<Option<Quantity>, StoreError> {
        let row = sqlx::query("SELECT quantity FROM inventory WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let quantity: i64 = row.try_get("quantity").map_err(map_sqlx)?;
                to_quantity(quantity).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn set_quantity(&self, name: &ItemName, quantity: Quantity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO inventory (name, quantity)
            VALUES ($1, $2)
            ON CONFLICT (name)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                updated_at = NOW()
            "#,
        )
        .bind(name.as_str())
        .bind(to_column(quantity)?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        tracing::debug!(item = %name, quantity = quantity.get(), "upserted inventory row");
        Ok(())
    }

    async fn remove(&self, name: &ItemName) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM inventory WHERE name = $1")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        tracing::debug!(item = %name, "deleted inventory row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_network_errors() {
        assert!(matches!(map_sqlx(sqlx::Error::PoolTimedOut), StoreError::Network(_)));
        assert!(matches!(map_sqlx(sqlx::Error::PoolClosed), StoreError::Network(_)));
        assert!(matches!(map_sqlx(sqlx::Error::RowNotFound), StoreError::Backend(_)));
    }

    #[test]
    fn rows_with_bad_keys_or_counts_are_malformed() {
        let item = decode_row("rice", 3).unwrap();
        assert_eq!((item.name.as_str(), item.quantity.get()), ("rice", 3));

        assert!(matches!(decode_row("Rice", 3), Err(StoreError::Decode(_))));
        assert!(matches!(decode_row("rice", 0), Err(StoreError::Decode(_))));
        assert!(matches!(decode_row("rice", -1), Err(StoreError::Decode(_))));
    }

    #[test]
    fn column_values_must_be_positive() {
        assert_eq!(to_quantity(5).unwrap().get(), 5);
        assert!(matches!(to_quantity(0), Err(StoreError::Decode(_))));
        assert!(matches!(to_quantity(-2), Err(StoreError::Decode(_))));
        assert!(matches!(
            to_column(Quantity::new(u64::MAX).unwrap()),
            Err(StoreError::Backend(_))
        ));
    }
}
