//! Supplier performance scoring.
//!
//! Derived, never stored as source-of-truth: recomputed from purchase-order
//! history each time it is needed. Absence of history is an expected steady
//! state for new suppliers and yields a zero-valued record, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use apotek_core::SupplierId;
use apotek_suppliers::Supplier;

use crate::order::PurchaseOrder;

/// Deviation thresholds (days) that cost a quality point each.
const DEVIATION_PENALTY_DAYS: f64 = 7.0;
const DEVIATION_SEVERE_DAYS: f64 = 14.0;

/// Fulfillment thresholds (percent) that cost a quality point each.
const FULFILLMENT_PENALTY_PCT: u32 = 80;
const FULFILLMENT_SEVERE_PCT: u32 = 60;

/// Derived supplier reliability metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierPerformance {
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub total_orders: u32,
    pub completed_orders: u32,
    /// Mean of |actual − expected| delivery dates in days, over orders that
    /// have both dates recorded. `None` when no order has both.
    pub avg_delivery_deviation_days: Option<f64>,
    /// Σ received / Σ ordered across completed orders' lines, as a rounded
    /// percentage. 0 when no completed orders.
    pub fulfillment_rate_pct: u32,
    /// 1–5 reliability score; 0 only for the zero-order record.
    pub quality_score: u8,
    /// Sum of order totals across all historical orders.
    pub total_value: u64,
    pub last_order_at: Option<DateTime<Utc>>,
}

impl SupplierPerformance {
    fn zero(supplier: &Supplier) -> Self {
        Self {
            supplier_id: supplier.id_typed(),
            supplier_name: supplier.name().to_string(),
            total_orders: 0,
            completed_orders: 0,
            avg_delivery_deviation_days: None,
            fulfillment_rate_pct: 0,
            quality_score: 0,
            total_value: 0,
            last_order_at: None,
        }
    }
}

/// Deterministic, monotonic penalty function: start at 5, subtract one point
/// per threshold crossed, clamp to [1, 5].
fn quality_score(fulfillment_rate_pct: u32, avg_deviation_days: Option<f64>) -> u8 {
    let mut score: i8 = 5;
    if fulfillment_rate_pct < FULFILLMENT_PENALTY_PCT {
        score -= 1;
    }
    if fulfillment_rate_pct < FULFILLMENT_SEVERE_PCT {
        score -= 1;
    }
    if let Some(deviation) = avg_deviation_days {
        if deviation > DEVIATION_PENALTY_DAYS {
            score -= 1;
        }
        if deviation > DEVIATION_SEVERE_DAYS {
            score -= 1;
        }
    }
    score.clamp(1, 5) as u8
}

/// Score one supplier from its purchase-order history.
///
/// Orders belonging to other suppliers are ignored, so callers may pass the
/// whole history collection unfiltered.
pub fn score_supplier(supplier: &Supplier, orders: &[PurchaseOrder]) -> SupplierPerformance {
    let orders: Vec<&PurchaseOrder> = orders
        .iter()
        .filter(|o| o.supplier_id == supplier.id_typed())
        .collect();

    if orders.is_empty() {
        return SupplierPerformance::zero(supplier);
    }

    let deviations: Vec<i64> = orders
        .iter()
        .filter_map(|o| o.delivery_deviation_days())
        .collect();
    let avg_deviation = if deviations.is_empty() {
        None
    } else {
        Some(deviations.iter().sum::<i64>() as f64 / deviations.len() as f64)
    };

    let (ordered, received) = orders
        .iter()
        .filter(|o| o.is_completed())
        .flat_map(|o| o.lines.iter())
        .fold((0u64, 0u64), |(ordered, received), line| {
            (
                ordered + u64::from(line.ordered_qty),
                received + u64::from(line.received_qty),
            )
        });
    let fulfillment_rate_pct = if ordered == 0 {
        0
    } else {
        (received as f64 / ordered as f64 * 100.0).round() as u32
    };

    SupplierPerformance {
        supplier_id: supplier.id_typed(),
        supplier_name: supplier.name().to_string(),
        total_orders: orders.len() as u32,
        completed_orders: orders.iter().filter(|o| o.is_completed()).count() as u32,
        avg_delivery_deviation_days: avg_deviation,
        fulfillment_rate_pct,
        quality_score: quality_score(fulfillment_rate_pct, avg_deviation),
        total_value: orders.iter().map(|o| o.total).sum(),
        last_order_at: orders.iter().map(|o| o.ordered_at).max(),
    }
}

/// Display ranking: descending by quality score, name as a stable tiebreak.
pub fn rank_suppliers(mut performances: Vec<SupplierPerformance>) -> Vec<SupplierPerformance> {
    performances.sort_by(|a, b| {
        b.quality_score
            .cmp(&a.quality_score)
            .then_with(|| a.supplier_name.cmp(&b.supplier_name))
    });
    performances
}
