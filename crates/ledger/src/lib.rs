//! Stock ledger domain module.
//!
//! The ledger is the append-only sequence of stock movements used to audit
//! and reconstruct stock levels. Deciding a movement (`plan_movement`) is a
//! pure function; appending it and updating the medication's denormalized
//! stock is the store layer's job, serialized per medication.

pub mod movement;

pub use movement::{
    plan_movement, replay, verify_chain, MovementDirection, MovementKind, StockMovement,
};
