use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ValueObject};

/// Inventory item name: the record key.
///
/// Names are case-insensitive; construction trims surrounding whitespace and
/// lowercases, so every lookup and write goes through the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        // The name doubles as a document key and a URL path segment.
        if normalized.contains('/') {
            return Err(DomainError::validation("name cannot contain '/'"));
        }
        if normalized == "." || normalized == ".." {
            return Err(DomainError::validation("name cannot be '.' or '..'"));
        }
        if normalized.len() >= 4 && normalized.starts_with("__") && normalized.ends_with("__") {
            return Err(DomainError::validation("names of the form __x__ are reserved"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ItemName {}

impl core::str::FromStr for ItemName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored item count. Never zero: a record that would reach zero is deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Quantity(u64);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u64) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::invariant("quantity must be at least 1"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn increment(self) -> DomainResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))
    }

    /// One unit less, or `None` when the count would reach zero.
    pub fn decrement(self) -> Option<Self> {
        match self.0 {
            1 => None,
            n => Some(Self(n - 1)),
        }
    }
}

impl ValueObject for Quantity {}

impl TryFrom<u64> for Quantity {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A stored record: name plus current count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: ItemName,
    pub quantity: Quantity,
}

impl InventoryItem {
    pub fn new(name: ItemName, quantity: Quantity) -> Self {
        Self { name, quantity }
    }

    /// Name with its first character upper-cased, for list rendering.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.as_str().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Entity for InventoryItem {
    type Id = ItemName;

    fn id(&self) -> &Self::Id {
        &self.name
    }
}

/// A single-unit user action against one item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCommand {
    AddUnit,
    RemoveUnit,
}

/// The write a command resolves to, given the currently stored quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockChange {
    /// Upsert the record with this quantity.
    Set(Quantity),
    /// Delete the record.
    Delete,
    /// Nothing to write.
    Unchanged,
}

impl StockCommand {
    /// Resolve the command against the current stored quantity.
    ///
    /// `{absent} -> add -> {1} -> add/remove -> {n} -> remove(n = 1) -> {absent}`;
    /// removing from an absent record is a no-op.
    pub fn apply(self, current: Option<Quantity>) -> DomainResult<StockChange> {
        match (self, current) {
            (StockCommand::AddUnit, None) => Ok(StockChange::Set(Quantity::ONE)),
            (StockCommand::AddUnit, Some(q)) => Ok(StockChange::Set(q.increment()?)),
            (StockCommand::RemoveUnit, None) => Ok(StockChange::Unchanged),
            (StockCommand::RemoveUnit, Some(q)) => Ok(match q.decrement() {
                Some(next) => StockChange::Set(next),
                None => StockChange::Delete,
            }),
        }
    }
}
