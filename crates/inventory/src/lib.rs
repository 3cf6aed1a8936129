//! Batch inventory domain module.
//!
//! Expiry-dated batches and the FEFO (First-Expired-First-Out) allocator.
//! Batch status is derived from the expiry date at evaluation time, never
//! trusted as stored data. Allocation is a pure query; applying one is a
//! store-layer operation.

pub mod batch;
pub mod fefo;

pub use batch::{classify, days_until_expiry, Batch, BatchStatus, DEFAULT_WARNING_DAYS};
pub use fefo::{allocate, eligible_quantity, has_enough_stock, Allocation, AllocationLine};
