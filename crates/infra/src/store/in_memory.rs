use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_inventory::{InventoryItem, ItemName, Quantity};

use super::{InventoryStore, StoreError};

/// In-memory inventory collection.
///
/// Intended for tests/dev. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    records: RwLock<HashMap<ItemName, Quantity>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records.
    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let records = items
            .into_iter()
            .map(|item| (item.name, item.quantity))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn list_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .iter()
            .map(|(name, quantity)| InventoryItem::new(name.clone(), *quantity))
            .collect())
    }

    async fn get_quantity(&self, name: &ItemName) -> Result<Option<Quantity>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(name).copied())
    }

    async fn set_quantity(&self, name: &ItemName, quantity: Quantity) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(name.clone(), quantity);
        Ok(())
    }

    async fn remove(&self, name: &ItemName) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> ItemName {
        ItemName::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn upsert_overwrites_and_lookup_reads_back() {
        let store = InMemoryInventoryStore::new();
        let flour = name("flour");

        assert_eq!(store.get_quantity(&flour).await.unwrap(), None);

        store.set_quantity(&flour, Quantity::ONE).await.unwrap();
        store
            .set_quantity(&flour, Quantity::new(7).unwrap())
            .await
            .unwrap();

        assert_eq!(
            store.get_quantity(&flour).await.unwrap(),
            Some(Quantity::new(7).unwrap())
        );
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_and_tolerates_absent() {
        let store = InMemoryInventoryStore::with_items([InventoryItem::new(
            name("eggs"),
            Quantity::new(12).unwrap(),
        )]);

        store.remove(&name("eggs")).await.unwrap();
        store.remove(&name("eggs")).await.unwrap();

        assert_eq!(store.get_quantity(&name("eggs")).await.unwrap(), None);
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
