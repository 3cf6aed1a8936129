//! Purchasing domain module.
//!
//! Purchase-order history records and the supplier performance scorer that
//! is recomputed from them each time it is needed.

pub mod order;
pub mod performance;

pub use order::{OrderLine, PurchaseOrder, PurchaseOrderStatus};
pub use performance::{rank_suppliers, score_supplier, SupplierPerformance};
