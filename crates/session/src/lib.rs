//! `stockroom-session` — the inventory view model.
//!
//! A session owns one store handle and the most recently loaded list of
//! items. Mutations go to the store and are followed by a full reload;
//! searching and sorting are pure derivations over the loaded list.

pub mod session;
pub mod view;

pub use session::{InventorySession, SessionError};
pub use view::{SortMode, filter_and_sort};
