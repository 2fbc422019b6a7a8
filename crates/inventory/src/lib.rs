//! Inventory domain module.
//!
//! This crate contains business rules for inventory counts, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{InventoryItem, ItemName, Quantity, StockChange, StockCommand};
