use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use apotek_core::{MedicationId, PurchaseOrderId, SupplierId};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Purchase order line item. `received_qty` lags `ordered_qty` until goods
/// arrive; short deliveries leave it lower for good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub medication_id: MedicationId,
    pub ordered_qty: u32,
    pub received_qty: u32,
    /// Unit price in smallest currency unit.
    pub unit_price: u64,
}

/// Purchase order history record.
///
/// This core consumes orders as read-only scoring input; creating and
/// progressing orders happens outside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub supplier_id: SupplierId,
    pub status: PurchaseOrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub expected_delivery: Option<NaiveDate>,
    pub actual_delivery: Option<NaiveDate>,
    pub lines: Vec<OrderLine>,
    /// Order total in smallest currency unit.
    pub total: u64,
}

impl PurchaseOrder {
    pub fn is_completed(&self) -> bool {
        self.status == PurchaseOrderStatus::Completed
    }

    pub fn contains_medication(&self, medication_id: MedicationId) -> bool {
        self.lines.iter().any(|l| l.medication_id == medication_id)
    }

    /// Absolute delivery deviation in days, when both dates are recorded.
    pub fn delivery_deviation_days(&self) -> Option<i64> {
        match (self.expected_delivery, self.actual_delivery) {
            (Some(expected), Some(actual)) => Some((actual - expected).num_days().abs()),
            _ => None,
        }
    }

    /// Most recent unit price quoted for a medication on this order.
    pub fn unit_price_for(&self, medication_id: MedicationId) -> Option<u64> {
        self.lines
            .iter()
            .find(|l| l.medication_id == medication_id)
            .map(|l| l.unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deviation_needs_both_dates() {
        let mut order = PurchaseOrder {
            id: PurchaseOrderId::new(),
            supplier_id: SupplierId::new(),
            status: PurchaseOrderStatus::Completed,
            ordered_at: Utc::now(),
            expected_delivery: Some(date(2025, 3, 10)),
            actual_delivery: None,
            lines: vec![],
            total: 0,
        };
        assert_eq!(order.delivery_deviation_days(), None);

        order.actual_delivery = Some(date(2025, 3, 7));
        // Early deliveries count as deviation too.
        assert_eq!(order.delivery_deviation_days(), Some(3));
    }
}
