use thiserror::Error;

use stockroom_core::DomainError;
use stockroom_infra::{InventoryStore, StoreError};
use stockroom_inventory::{InventoryItem, ItemName, Quantity, StockChange, StockCommand};

use crate::view::{SortMode, filter_and_sort};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One user's view of the inventory.
///
/// The loaded list is a disposable copy of the store, replaced wholesale by
/// [`refresh`](Self::refresh) after every mutation. If that reload fails the
/// mutation still succeeds, and the list is patched locally with the written
/// value until the next successful refresh. Mutations take `&mut self`,
/// so a session issues at most one read-then-write sequence at a time. Two
/// sessions against the same collection can still interleave.
#[derive(Debug)]
pub struct InventorySession<S> {
    store: S,
    items: Vec<InventoryItem>,
}

impl<S> InventorySession<S>
where
    S: InventoryStore,
{
    /// A session with nothing loaded yet.
    pub fn new(store: S) -> Self {
        Self {
            store,
            items: Vec::new(),
        }
    }

    /// Construct and perform the initial load.
    pub async fn start(store: S) -> Result<Self, SessionError> {
        let mut session = Self::new(store);
        session.refresh().await?;
        Ok(session)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The most recently loaded list, in store order.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Look up an item in the loaded list.
    pub fn item(&self, name: &ItemName) -> Option<&InventoryItem> {
        self.items.iter().find(|item| &item.name == name)
    }

    /// Reload the full list from the store.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let items = self.store.list_all().await.inspect_err(|err| {
            tracing::warn!(error = %err, "inventory refresh failed");
        })?;
        tracing::debug!(count = items.len(), "inventory refreshed");
        self.items = items;
        Ok(())
    }

    /// Add one unit of `name`, creating the record at 1 if absent.
    ///
    /// Returns the stored quantity.
    pub async fn add_item(&mut self, name: &str) -> Result<Quantity, SessionError> {
        let name = ItemName::parse(name)?;
        let stored = self.apply(&name, StockCommand::AddUnit).await?;
        stored.ok_or_else(|| DomainError::invariant("add produced no record").into())
    }

    /// Remove one unit of `name`; the record is deleted when it reaches zero.
    /// Removing an absent item writes nothing.
    ///
    /// Returns the stored quantity, `None` when no record remains.
    pub async fn remove_item(&mut self, name: &str) -> Result<Option<Quantity>, SessionError> {
        let name = ItemName::parse(name)?;
        self.apply(&name, StockCommand::RemoveUnit).await
    }

    /// Search and sort the loaded list.
    pub fn filter_and_sort(&self, query: &str, mode: SortMode) -> Vec<InventoryItem> {
        filter_and_sort(&self.items, query, mode)
    }

    async fn apply(
        &mut self,
        name: &ItemName,
        command: StockCommand,
    ) -> Result<Option<Quantity>, SessionError> {
        let current = self.store.get_quantity(name).await?;

        let stored = match command.apply(current)? {
            StockChange::Set(quantity) => {
                self.store.set_quantity(name, quantity).await?;
                Some(quantity)
            }
            StockChange::Delete => {
                self.store.remove(name).await?;
                None
            }
            StockChange::Unchanged => current,
        };

        tracing::info!(
            item = %name,
            ?command,
            before = current.map(Quantity::get),
            after = stored.map(Quantity::get),
            "inventory updated"
        );

        self.patch_loaded(name, stored);
        if let Err(err) = self.refresh().await {
            // The write is committed; reporting it as failed would invite a retry.
            tracing::warn!(item = %name, error = %err, "reload after update failed; keeping patched list");
        }
        Ok(stored)
    }

    fn patch_loaded(&mut self, name: &ItemName, stored: Option<Quantity>) {
        let position = self.items.iter().position(|item| &item.name == name);
        match (position, stored) {
            (Some(i), Some(quantity)) => self.items[i].quantity = quantity,
            (Some(i), None) => {
                self.items.remove(i);
            }
            (None, Some(quantity)) => self.items.push(InventoryItem::new(name.clone(), quantity)),
            (None, None) => {}
        }
    }
}
