//! Inventory store adapter: the remote collection of item records.
//!
//! Each record is keyed by its normalized [`ItemName`] and carries a single
//! positive quantity. The store is the source of truth; callers keep no state
//! that survives a refresh.

pub mod firestore;
pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_inventory::{InventoryItem, ItemName, Quantity};

use crate::config::{StoreBackend, StoreConfig};

pub use firestore::FirestoreInventoryStore;
pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

/// Store operation error.
///
/// Infrastructure failures only. A missing record on lookup is `Ok(None)`,
/// not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (connect failure, timeout, unavailable).
    #[error("store unreachable: {0}")]
    Network(String),

    /// The store refused the operation for these credentials.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other failure reported by the store.
    #[error("store error: {0}")]
    Backend(String),

    /// A stored record could not be read as an inventory item.
    #[error("malformed record: {0}")]
    Decode(String),
}

/// Remote collection of inventory records.
///
/// Every operation is a single round trip. There is no atomicity across
/// calls: a read followed by a write may race with another writer.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Every record in the collection, in no particular order.
    async fn list_all(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// Point lookup by name.
    async fn get_quantity(&self, name: &ItemName) -> Result<Option<Quantity>, StoreError>;

    /// Upsert: create the record or overwrite its quantity.
    async fn set_quantity(&self, name: &ItemName, quantity: Quantity) -> Result<(), StoreError>;

    /// Delete the record. Deleting an absent record succeeds.
    async fn remove(&self, name: &ItemName) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).list_all().await
    }

    async fn get_quantity(&self, name: &ItemName) -> Result<Option<Quantity>, StoreError> {
        (**self).get_quantity(name).await
    }

    async fn set_quantity(&self, name: &ItemName, quantity: Quantity) -> Result<(), StoreError> {
        (**self).set_quantity(name, quantity).await
    }

    async fn remove(&self, name: &ItemName) -> Result<(), StoreError> {
        (**self).remove(name).await
    }
}

/// Parse a key read back from a backend.
///
/// Only keys already in normalized form are accepted. A key such as `Foo`
/// written by another client would list as `foo` and every later lookup
/// would miss it, so it is reported as malformed instead.
pub(crate) fn parse_stored_key(raw: &str) -> Result<ItemName, StoreError> {
    let name = ItemName::parse(raw).map_err(|e| StoreError::Decode(format!("key {raw:?}: {e}")))?;
    if name.as_str() != raw {
        return Err(StoreError::Decode(format!(
            "key {raw:?} is not normalized (expected {:?})",
            name.as_str()
        )));
    }
    Ok(name)
}

/// Build the configured backend.
///
/// The Postgres backend connects eagerly and creates its table if needed.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn InventoryStore>, StoreError> {
    match &config.backend {
        StoreBackend::InMemory => {
            tracing::info!(backend = "memory", "opening inventory store");
            Ok(Arc::new(InMemoryInventoryStore::new()))
        }
        StoreBackend::Firestore(firestore) => {
            tracing::info!(
                backend = "firestore",
                project = %firestore.project_id,
                "opening inventory store"
            );
            Ok(Arc::new(FirestoreInventoryStore::new(firestore)?))
        }
        StoreBackend::Postgres { database_url } => {
            tracing::info!(backend = "postgres", "opening inventory store");
            let store = PostgresInventoryStore::connect(database_url).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
