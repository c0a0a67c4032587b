//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Tenants and applications are identified by name, not by the data they carry.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
