//! Infrastructure layer: remote inventory stores and their configuration.

pub mod config;
pub mod store;

pub use config::{ConfigError, FirestoreConfig, StoreBackend, StoreConfig};
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError, open_store};
