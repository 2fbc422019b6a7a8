//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// An inventory record keeps its identity (the normalized name) while its
/// quantity changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
