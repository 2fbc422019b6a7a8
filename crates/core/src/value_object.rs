//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, construct a new value (e.g. `Quantity::increment` returns a
/// fresh `Quantity`).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct ItemName(String);
///
/// impl ValueObject for ItemName {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
