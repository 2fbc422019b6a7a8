use serde::Deserialize;
use serde_json::{Value, json};

use stockroom_inventory::{InventoryItem, ItemName, Quantity};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring to match against item names.
    pub q: Option<String>,
    /// `Alpha`, `QLTH`, or `QHTL`.
    pub sort: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn item_to_json(item: &InventoryItem) -> Value {
    json!({
        "name": item.name.as_str(),
        "display_name": item.display_name(),
        "quantity": item.quantity.get(),
    })
}

pub fn items_to_json(items: &[InventoryItem]) -> Value {
    json!({
        "items": items.iter().map(item_to_json).collect::<Vec<_>>(),
    })
}

/// Stored count after a mutation; 0 means no record remains.
pub fn stored_to_json(name: &ItemName, stored: Option<Quantity>) -> Value {
    json!({
        "name": name.as_str(),
        "quantity": stored.map(Quantity::get).unwrap_or(0),
    })
}
