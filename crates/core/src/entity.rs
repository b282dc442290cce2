//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Taxonomies, taxons and payment methods are entities: two instances with the
/// same id are the same record, whatever their current field values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Identity comparison (ignores every other field).
    fn same_entity_as(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
