//! Entity trait: identity + continuity across state changes.

/// Minimal interface shared by stored records (medications, batches,
/// suppliers). A record keeps the same id across edits, archival, and
/// stock changes; collections are keyed by it.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
