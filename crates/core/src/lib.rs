//! `apotek-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error taxonomy, the `Entity` trait, and the
//! injectable clock used by anything that reasons about expiry dates.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    ActorId, AlertId, BatchId, MedicationId, MovementId, PurchaseOrderId, SuggestionId, SupplierId,
};
