//! FEFO allocation: consume from the nearest-expiry batch first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use apotek_core::BatchId;

use crate::batch::Batch;

/// One batch's share of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub batch_id: BatchId,
    pub quantity: u32,
}

/// Result of a FEFO allocation query.
///
/// The allocator never decides whether a shortage is acceptable; point-of-sale
/// rejects partial fulfillment, a transfer may accept it. That policy belongs
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub lines: Vec<AllocationLine>,
    pub requested: u32,
    /// Units that could not be covered by eligible stock.
    pub shortfall: u32,
}

impl Allocation {
    pub fn allocated(&self) -> u32 {
        self.requested - self.shortfall
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall == 0
    }
}

/// Sum of allocatable stock (non-expired batches with quantity > 0).
pub fn eligible_quantity(batches: &[Batch], today: NaiveDate) -> u32 {
    batches
        .iter()
        .filter(|b| b.is_eligible(today))
        .map(Batch::quantity)
        .sum()
}

/// Fast pre-check before attempting allocation.
pub fn has_enough_stock(batches: &[Batch], quantity: u32, today: NaiveDate) -> bool {
    eligible_quantity(batches, today) >= quantity
}

/// Allocate `requested` units across eligible batches, oldest expiry first.
///
/// Ties on expiry date break by batch id (UUIDv7, so oldest-received first),
/// keeping results reproducible. Pure query: no batch is mutated; applying
/// the allocation is a separate ledger operation.
pub fn allocate(batches: &[Batch], requested: u32, today: NaiveDate) -> Allocation {
    let mut eligible: Vec<&Batch> = batches.iter().filter(|b| b.is_eligible(today)).collect();
    eligible.sort_by_key(|b| (b.expiry_date(), b.id_typed()));

    let mut remaining = requested;
    let mut lines = Vec::new();
    for batch in eligible {
        if remaining == 0 {
            break;
        }
        let take = batch.quantity().min(remaining);
        lines.push(AllocationLine {
            batch_id: batch.id_typed(),
            quantity: take,
        });
        remaining -= take;
    }

    Allocation {
        lines,
        requested,
        shortfall: remaining,
    }
}
