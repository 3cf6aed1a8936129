use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use apotek_core::{BatchId, DomainError, DomainResult, Entity, MedicationId, SupplierId};

/// Default near-expiry warning window, in days. Externally configurable;
/// callers pass their own value into `Batch::status` and alert generation.
pub const DEFAULT_WARNING_DAYS: u32 = 30;

/// Derived batch state. Recomputed on read against the current date; the
/// persisted value, if any, is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Active,
    NearExpiry,
    Expired,
}

/// Whole-day distance from `today` to `expiry`. Negative once expired;
/// zero on the expiry date itself (still sellable that day).
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Classify an expiry date against the warning window.
pub fn classify(expiry: NaiveDate, today: NaiveDate, warning_days: u32) -> BatchStatus {
    let days = days_until_expiry(expiry, today);
    if days < 0 {
        BatchStatus::Expired
    } else if days <= i64::from(warning_days) {
        BatchStatus::NearExpiry
    } else {
        BatchStatus::Active
    }
}

/// Entity: Batch. One received lot sharing an expiry date and purchase price.
///
/// Quantity is decremented only by allocation application and incremented
/// only by receiving stock; it never goes negative. Batches are kept at zero
/// quantity so the audit trail stays complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    id: BatchId,
    medication_id: MedicationId,
    batch_number: String,
    expiry_date: NaiveDate,
    quantity: u32,
    /// Purchase price per unit in smallest currency unit.
    purchase_price: u64,
    received_at: DateTime<Utc>,
    supplier_id: SupplierId,
}

impl Batch {
    pub fn new(
        id: BatchId,
        medication_id: MedicationId,
        batch_number: impl Into<String>,
        expiry_date: NaiveDate,
        quantity: u32,
        purchase_price: u64,
        received_at: DateTime<Utc>,
        supplier_id: SupplierId,
    ) -> DomainResult<Self> {
        let batch_number = batch_number.into();
        if batch_number.trim().is_empty() {
            return Err(DomainError::validation("batch number cannot be empty"));
        }
        if quantity == 0 {
            return Err(DomainError::validation("received quantity must be positive"));
        }
        Ok(Self {
            id,
            medication_id,
            batch_number,
            expiry_date,
            quantity,
            purchase_price,
            received_at,
            supplier_id,
        })
    }

    pub fn id_typed(&self) -> BatchId {
        self.id
    }

    pub fn medication_id(&self) -> MedicationId {
        self.medication_id
    }

    pub fn batch_number(&self) -> &str {
        &self.batch_number
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn purchase_price(&self) -> u64 {
        self.purchase_price
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        days_until_expiry(self.expiry_date, today)
    }

    pub fn status(&self, today: NaiveDate, warning_days: u32) -> BatchStatus {
        classify(self.expiry_date, today, warning_days)
    }

    /// Allocatable: not yet expired and something left on hand. Near-expiry
    /// batches are still sellable; FEFO exists to drain them first.
    pub fn is_eligible(&self, today: NaiveDate) -> bool {
        self.quantity > 0 && self.days_until_expiry(today) >= 0
    }

    /// Put units back on the shelf: customer returns and upward stock-opname
    /// corrections, both of which re-enter through the ledger.
    pub fn restock(&mut self, quantity: u32) -> DomainResult<()> {
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("batch quantity overflow"))?;
        Ok(())
    }

    /// Remove allocated units. Fails without mutating if the batch holds
    /// fewer units than asked; quantities never go negative.
    pub fn deduct(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity > self.quantity {
            return Err(DomainError::invariant(format!(
                "batch {} holds {} units, cannot deduct {}",
                self.id, self.quantity, quantity
            )));
        }
        self.quantity -= quantity;
        Ok(())
    }
}

impl Entity for Batch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(expiry: NaiveDate, quantity: u32) -> Batch {
        Batch::new(
            BatchId::new(),
            MedicationId::new(),
            "B-2025-001",
            expiry,
            quantity,
            1200,
            Utc::now(),
            SupplierId::new(),
        )
        .unwrap()
    }

    #[test]
    fn classify_window_boundaries() {
        let today = date(2025, 6, 1);
        // Exactly warning_days out: NearExpiry.
        assert_eq!(classify(date(2025, 7, 1), today, 30), BatchStatus::NearExpiry);
        // One day past the window: Active.
        assert_eq!(classify(date(2025, 7, 2), today, 30), BatchStatus::Active);
        // Yesterday: Expired.
        assert_eq!(classify(date(2025, 5, 31), today, 30), BatchStatus::Expired);
        // Expiry date itself: still NearExpiry, not Expired.
        assert_eq!(classify(today, today, 30), BatchStatus::NearExpiry);
    }

    #[test]
    fn near_expiry_batch_is_still_eligible() {
        let today = date(2025, 6, 1);
        let b = batch(date(2025, 6, 5), 10);
        assert_eq!(b.status(today, 30), BatchStatus::NearExpiry);
        assert!(b.is_eligible(today));
    }

    #[test]
    fn expired_or_empty_batch_is_not_eligible() {
        let today = date(2025, 6, 1);
        assert!(!batch(date(2025, 5, 20), 10).is_eligible(today));

        let mut b = batch(date(2025, 12, 1), 10);
        b.deduct(10).unwrap();
        assert!(!b.is_eligible(today));
    }

    #[test]
    fn deduct_beyond_quantity_fails_without_mutating() {
        let mut b = batch(date(2025, 12, 1), 10);
        assert!(b.deduct(11).is_err());
        assert_eq!(b.quantity(), 10);
    }

    #[test]
    fn zero_received_quantity_is_rejected() {
        let err = Batch::new(
            BatchId::new(),
            MedicationId::new(),
            "B-1",
            date(2025, 12, 1),
            0,
            1200,
            Utc::now(),
            SupplierId::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
