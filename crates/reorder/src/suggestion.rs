use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use apotek_catalog::Medication;
use apotek_core::{MedicationId, SuggestionId, SupplierId};
use apotek_purchasing::{score_supplier, PurchaseOrder};
use apotek_suppliers::Supplier;

/// Urgency of restocking, from the stock ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

/// Suggestion lifecycle. `Ordered` and `Dismissed` record a user decision
/// that regeneration must preserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Ordered,
    Dismissed,
}

/// The supplier a suggestion recommends buying from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedSupplier {
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    /// Unit price on the most recent order containing this medication.
    pub last_price: Option<u64>,
    pub avg_delivery_deviation_days: Option<f64>,
    pub quality_score: u8,
}

/// One reorder recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub id: SuggestionId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub current_stock: u32,
    pub minimum_stock: u32,
    pub suggested_qty: u32,
    /// `None` only under `SkipPolicy::SuggestWithoutSupplier`.
    pub supplier: Option<RecommendedSupplier>,
    pub priority: SuggestionPriority,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

/// What to do with a low-stock medication that has no supplier history.
///
/// Skipping is the default: without history there is no supplier to
/// recommend and no price to quote. It is an explicit policy so the choice
/// is visible and testable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SkipPolicy {
    /// No purchase history for the medication means no suggestion.
    #[default]
    SkipWithoutHistory,
    /// Emit the suggestion anyway, with no recommended supplier.
    SuggestWithoutSupplier,
}

/// Enough to restore stock to at least twice the reorder threshold.
pub fn suggested_quantity(current_stock: u32, minimum_stock: u32) -> u32 {
    let deficit_plus_buffer = minimum_stock.saturating_sub(current_stock) + minimum_stock;
    (2 * minimum_stock).max(deficit_plus_buffer)
}

fn priority_for_ratio(ratio: f64) -> SuggestionPriority {
    if ratio <= 0.3 {
        SuggestionPriority::High
    } else if ratio <= 0.7 {
        SuggestionPriority::Medium
    } else {
        SuggestionPriority::Low
    }
}

/// Composite selection score for a candidate supplier. Higher is better.
fn selection_score(quality_score: u8, fulfillment_rate_pct: u32, avg_deviation: Option<f64>) -> f64 {
    f64::from(quality_score) * 10.0 + f64::from(fulfillment_rate_pct) / 10.0
        - avg_deviation.unwrap_or(0.0) / 2.0
}

/// Pick the best supplier for a medication from purchase-order history.
///
/// Only suppliers whose history contains the medication are considered;
/// returns `None` when no such history exists.
pub fn select_supplier(
    medication_id: MedicationId,
    suppliers: &[Supplier],
    orders: &[PurchaseOrder],
) -> Option<RecommendedSupplier> {
    let mut best: Option<(f64, RecommendedSupplier)> = None;

    for supplier in suppliers {
        let history: Vec<&PurchaseOrder> = orders
            .iter()
            .filter(|o| {
                o.supplier_id == supplier.id_typed() && o.contains_medication(medication_id)
            })
            .collect();
        if history.is_empty() {
            continue;
        }

        let perf = score_supplier(supplier, orders);
        let score = selection_score(
            perf.quality_score,
            perf.fulfillment_rate_pct,
            perf.avg_delivery_deviation_days,
        );
        let last_price = history
            .iter()
            .max_by_key(|o| o.ordered_at)
            .and_then(|o| o.unit_price_for(medication_id));

        let candidate = RecommendedSupplier {
            supplier_id: supplier.id_typed(),
            supplier_name: supplier.name().to_string(),
            last_price,
            avg_delivery_deviation_days: perf.avg_delivery_deviation_days,
            quality_score: perf.quality_score,
        };

        let better = match &best {
            None => true,
            Some((best_score, best_candidate)) => {
                score > *best_score
                    || (score == *best_score && candidate.supplier_name < best_candidate.supplier_name)
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }

    best.map(|(_, candidate)| candidate)
}

/// Generate suggestions for every non-archived medication at or below its
/// reorder threshold, most depleted first.
pub fn generate(
    medications: &[Medication],
    suppliers: &[Supplier],
    orders: &[PurchaseOrder],
    now: DateTime<Utc>,
    policy: SkipPolicy,
) -> Vec<ReorderSuggestion> {
    let mut candidates: Vec<&Medication> = medications
        .iter()
        .filter(|m| !m.is_archived() && m.is_low_stock())
        .collect();
    candidates.sort_by(|a, b| {
        a.stock_ratio()
            .total_cmp(&b.stock_ratio())
            .then_with(|| a.id_typed().cmp(&b.id_typed()))
    });

    let mut suggestions = Vec::new();
    for medication in candidates {
        let supplier = select_supplier(medication.id_typed(), suppliers, orders);
        if supplier.is_none() && policy == SkipPolicy::SkipWithoutHistory {
            info!(
                medication_id = %medication.id_typed(),
                medication = medication.name(),
                "no supplier history, skipping reorder suggestion"
            );
            continue;
        }

        suggestions.push(ReorderSuggestion {
            id: SuggestionId::new(),
            medication_id: medication.id_typed(),
            medication_name: medication.name().to_string(),
            current_stock: medication.current_stock(),
            minimum_stock: medication.minimum_stock(),
            suggested_qty: suggested_quantity(medication.current_stock(), medication.minimum_stock()),
            supplier,
            priority: priority_for_ratio(medication.stock_ratio()),
            status: SuggestionStatus::Pending,
            created_at: now,
        });
    }
    suggestions
}

/// Merge freshly generated suggestions with existing ones, keyed by
/// medication id.
///
/// An existing `Ordered` or `Dismissed` suggestion wins outright: the prior
/// decision is preserved and never resurrected as pending. An existing
/// `Pending` one lends its id and creation time to the refreshed numbers.
pub fn merge(fresh: Vec<ReorderSuggestion>, existing: &[ReorderSuggestion]) -> Vec<ReorderSuggestion> {
    fresh
        .into_iter()
        .map(|mut suggestion| {
            match existing
                .iter()
                .find(|e| e.medication_id == suggestion.medication_id)
            {
                Some(prior) if prior.status != SuggestionStatus::Pending => prior.clone(),
                Some(prior) => {
                    suggestion.id = prior.id;
                    suggestion.created_at = prior.created_at;
                    suggestion
                }
                None => suggestion,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotek_catalog::MedicationDetails;
    use apotek_core::PurchaseOrderId;
    use apotek_purchasing::{OrderLine, PurchaseOrderStatus};
    use apotek_suppliers::ContactInfo;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn medication(name: &str, minimum: u32, current: u32) -> Medication {
        let mut m = Medication::new(
            MedicationId::new(),
            MedicationDetails {
                name: name.to_string(),
                category: "analgesic".to_string(),
                form: "tablet".to_string(),
                unit: "strip".to_string(),
                purchase_price: 900,
                sale_price: 1200,
            },
            minimum,
            Utc::now(),
        )
        .unwrap();
        m.apply_stock_level(current, Utc::now());
        m
    }

    fn supplier(name: &str) -> Supplier {
        Supplier::new(SupplierId::new(), name, ContactInfo::default(), Utc::now()).unwrap()
    }

    fn order_for(
        supplier: &Supplier,
        medication: &Medication,
        received: u32,
        deviation: i64,
        unit_price: u64,
    ) -> PurchaseOrder {
        let expected = date(2025, 2, 1);
        PurchaseOrder {
            id: PurchaseOrderId::new(),
            supplier_id: supplier.id_typed(),
            status: PurchaseOrderStatus::Completed,
            ordered_at: Utc::now(),
            expected_delivery: Some(expected),
            actual_delivery: Some(expected + chrono::Duration::days(deviation)),
            lines: vec![OrderLine {
                medication_id: medication.id_typed(),
                ordered_qty: 100,
                received_qty: received,
                unit_price,
            }],
            total: u64::from(received) * unit_price,
        }
    }

    #[test]
    fn suggested_quantity_restores_twice_the_threshold() {
        // Deficit path: (10 - 2) + 10 = 18 < 20, so the 2x floor wins.
        assert_eq!(suggested_quantity(2, 10), 20);
        // Deep deficit path with stock at zero: max(20, 20) = 20.
        assert_eq!(suggested_quantity(0, 10), 20);
        assert_eq!(suggested_quantity(10, 10), 20);
        assert_eq!(suggested_quantity(0, 0), 0);
    }

    #[test]
    fn candidates_are_most_depleted_first() {
        let nearly_out = medication("A", 10, 1);
        let half = medication("B", 10, 5);
        let fine = medication("C", 10, 50);
        let s = supplier("Kimia Farma");
        let orders = vec![
            order_for(&s, &nearly_out, 100, 0, 900),
            order_for(&s, &half, 100, 0, 900),
        ];

        let suggestions = generate(
            &[half.clone(), fine, nearly_out.clone()],
            std::slice::from_ref(&s),
            &orders,
            Utc::now(),
            SkipPolicy::default(),
        );

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].medication_id, nearly_out.id_typed());
        assert_eq!(suggestions[0].priority, SuggestionPriority::High);
        assert_eq!(suggestions[1].medication_id, half.id_typed());
        assert_eq!(suggestions[1].priority, SuggestionPriority::Medium);
    }

    #[test]
    fn no_history_is_skipped_by_default() {
        let low = medication("Orphan", 10, 1);
        let s = supplier("Kimia Farma");
        let suggestions = generate(
            std::slice::from_ref(&low),
            std::slice::from_ref(&s),
            &[],
            Utc::now(),
            SkipPolicy::SkipWithoutHistory,
        );
        assert!(suggestions.is_empty());
    }

    #[test]
    fn no_history_can_still_suggest_without_supplier() {
        let low = medication("Orphan", 10, 1);
        let suggestions = generate(
            std::slice::from_ref(&low),
            &[],
            &[],
            Utc::now(),
            SkipPolicy::SuggestWithoutSupplier,
        );
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].supplier.is_none());
    }

    #[test]
    fn best_scoring_supplier_is_picked_with_last_price() {
        let low = medication("Paracetamol", 10, 2);
        let punctual = supplier("Punctual");
        let sloppy = supplier("Sloppy");
        let orders = vec![
            order_for(&punctual, &low, 100, 0, 950),
            order_for(&sloppy, &low, 40, 20, 700),
        ];

        let picked = select_supplier(low.id_typed(), &[sloppy, punctual.clone()], &orders).unwrap();
        assert_eq!(picked.supplier_id, punctual.id_typed());
        assert_eq!(picked.last_price, Some(950));
        assert_eq!(picked.quality_score, 5);
    }

    #[test]
    fn dismissed_suggestion_is_not_resurrected() {
        let low = medication("Paracetamol", 10, 2);
        let s = supplier("Kimia Farma");
        let orders = vec![order_for(&s, &low, 100, 0, 900)];

        let mut first = generate(
            std::slice::from_ref(&low),
            std::slice::from_ref(&s),
            &orders,
            Utc::now(),
            SkipPolicy::default(),
        );
        first[0].status = SuggestionStatus::Dismissed;

        let regenerated = generate(
            std::slice::from_ref(&low),
            std::slice::from_ref(&s),
            &orders,
            Utc::now(),
            SkipPolicy::default(),
        );
        let merged = merge(regenerated, &first);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].status, SuggestionStatus::Dismissed);
        assert_eq!(merged[0].id, first[0].id);
    }

    #[test]
    fn pending_suggestion_is_refreshed_in_place() {
        let mut low = medication("Paracetamol", 10, 2);
        let s = supplier("Kimia Farma");
        let orders = vec![order_for(&s, &low, 100, 0, 900)];

        let first = generate(
            std::slice::from_ref(&low),
            std::slice::from_ref(&s),
            &orders,
            Utc::now(),
            SkipPolicy::default(),
        );

        low.apply_stock_level(6, Utc::now());
        let regenerated = generate(
            std::slice::from_ref(&low),
            std::slice::from_ref(&s),
            &orders,
            Utc::now(),
            SkipPolicy::default(),
        );
        let merged = merge(regenerated, &first);

        assert_eq!(merged[0].id, first[0].id);
        assert_eq!(merged[0].current_stock, 6);
        assert_eq!(merged[0].status, SuggestionStatus::Pending);
    }
}
