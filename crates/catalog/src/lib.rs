//! Medication catalog domain module.
//!
//! This crate contains the catalog entry for a medication, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod medication;

pub use medication::{Medication, MedicationDetails, MedicationStatus};
