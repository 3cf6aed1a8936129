//! Supplier domain module.

pub mod supplier;

pub use supplier::{ContactInfo, Supplier, SupplierStatus};
