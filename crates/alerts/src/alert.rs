use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use apotek_catalog::Medication;
use apotek_core::{AlertId, BatchId, MedicationId};
use apotek_inventory::Batch;

/// Alert urgency, most urgent first in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

impl AlertPriority {
    fn rank(self) -> u8 {
        match self {
            AlertPriority::High => 0,
            AlertPriority::Medium => 1,
            AlertPriority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

/// One expiry alert snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub id: AlertId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub batch_id: BatchId,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: u32,
    pub days_until_expiry: i64,
    pub priority: AlertPriority,
    pub status: AlertStatus,
}

impl ExpiryAlert {
    /// Status-only transition; never touches batch or stock state.
    pub fn resolve(&mut self) {
        self.status = AlertStatus::Resolved;
    }
}

/// Priority by distance to expiry. Already-expired batches (negative days)
/// are the most urgent.
pub fn priority_for(days_until_expiry: i64) -> AlertPriority {
    if days_until_expiry <= 7 {
        AlertPriority::High
    } else if days_until_expiry <= 14 {
        AlertPriority::Medium
    } else {
        AlertPriority::Low
    }
}

/// Generate alerts for every batch of every non-archived medication whose
/// expiry falls inside the warning window (expired batches included).
///
/// Batches drained to zero still alert: the snapshot records that the lot
/// passed through the window, and resolving it is the pharmacist's call.
/// Re-running does not deduplicate against prior runs; persisting callers
/// reconcile by batch id (`reconcile`).
pub fn generate(
    medications: &[Medication],
    batches: &[Batch],
    today: NaiveDate,
    warning_days: u32,
) -> Vec<ExpiryAlert> {
    let mut alerts: Vec<ExpiryAlert> = Vec::new();
    for medication in medications.iter().filter(|m| !m.is_archived()) {
        for batch in batches
            .iter()
            .filter(|b| b.medication_id() == medication.id_typed())
        {
            let days = batch.days_until_expiry(today);
            if days > i64::from(warning_days) {
                continue;
            }
            alerts.push(ExpiryAlert {
                id: AlertId::new(),
                medication_id: medication.id_typed(),
                medication_name: medication.name().to_string(),
                batch_id: batch.id_typed(),
                batch_number: batch.batch_number().to_string(),
                expiry_date: batch.expiry_date(),
                quantity: batch.quantity(),
                days_until_expiry: days,
                priority: priority_for(days),
                status: AlertStatus::Active,
            });
        }
    }
    sort_for_display(&mut alerts);
    alerts
}

/// Most urgent first: priority rank ascending, then days-until-expiry
/// ascending, batch id as a deterministic tail.
pub fn sort_for_display(alerts: &mut [ExpiryAlert]) {
    alerts.sort_by_key(|a| (a.priority.rank(), a.days_until_expiry, a.batch_id));
}

/// Merge freshly generated alerts with persisted snapshots, keyed by batch id.
///
/// Fresh values (dates, quantities, priority) win; a previously resolved
/// alert stays resolved and keeps its id, so re-generation never spams the
/// notification sink with duplicates. Persisted alerts whose batch no longer
/// qualifies are dropped.
pub fn reconcile(fresh: Vec<ExpiryAlert>, persisted: &[ExpiryAlert]) -> Vec<ExpiryAlert> {
    fresh
        .into_iter()
        .map(|mut alert| {
            if let Some(prior) = persisted.iter().find(|p| p.batch_id == alert.batch_id) {
                alert.id = prior.id;
                alert.status = prior.status;
            }
            alert
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotek_catalog::MedicationDetails;
    use apotek_core::SupplierId;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn medication(name: &str) -> Medication {
        Medication::new(
            MedicationId::new(),
            MedicationDetails {
                name: name.to_string(),
                category: "antibiotic".to_string(),
                form: "capsule".to_string(),
                unit: "strip".to_string(),
                purchase_price: 800,
                sale_price: 1000,
            },
            10,
            Utc::now(),
        )
        .unwrap()
    }

    fn batch_for(medication: &Medication, expiry: NaiveDate, quantity: u32) -> Batch {
        Batch::new(
            BatchId::new(),
            medication.id_typed(),
            "B-1",
            expiry,
            quantity,
            800,
            Utc::now(),
            SupplierId::new(),
        )
        .unwrap()
    }

    #[test]
    fn priority_bands() {
        assert_eq!(priority_for(-3), AlertPriority::High);
        assert_eq!(priority_for(0), AlertPriority::High);
        assert_eq!(priority_for(7), AlertPriority::High);
        assert_eq!(priority_for(8), AlertPriority::Medium);
        assert_eq!(priority_for(14), AlertPriority::Medium);
        assert_eq!(priority_for(15), AlertPriority::Low);
        assert_eq!(priority_for(30), AlertPriority::Low);
    }

    #[test]
    fn only_batches_inside_the_window_alert() {
        let today = date(2025, 6, 1);
        let med = medication("Amoxicillin 500mg");
        let batches = vec![
            batch_for(&med, date(2025, 7, 1), 5),  // exactly 30 days out
            batch_for(&med, date(2025, 7, 2), 5),  // 31 days out, no alert
            batch_for(&med, date(2025, 5, 31), 5), // expired yesterday
        ];
        let alerts = generate(std::slice::from_ref(&med), &batches, today, 30);

        assert_eq!(alerts.len(), 2);
        // Expired batch first: high priority, negative days.
        assert_eq!(alerts[0].days_until_expiry, -1);
        assert_eq!(alerts[0].priority, AlertPriority::High);
        assert_eq!(alerts[1].days_until_expiry, 30);
        assert_eq!(alerts[1].priority, AlertPriority::Low);
    }

    #[test]
    fn archived_medications_are_skipped() {
        let today = date(2025, 6, 1);
        let mut archived = medication("Old stock");
        archived.archive(Utc::now());
        let live = medication("Amoxicillin 500mg");

        let batches = vec![
            batch_for(&archived, date(2025, 6, 10), 5),
            batch_for(&live, date(2025, 6, 10), 3),
        ];

        let alerts = generate(&[archived, live], &batches, today, 30);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].quantity, 3);
    }

    #[test]
    fn drained_batches_inside_the_window_still_alert() {
        let today = date(2025, 6, 1);
        let med = medication("Amoxicillin 500mg");

        let mut drained = batch_for(&med, date(2025, 6, 10), 5);
        drained.deduct(5).unwrap();
        let batches = vec![drained, batch_for(&med, date(2025, 6, 10), 3)];

        let alerts = generate(std::slice::from_ref(&med), &batches, today, 30);
        assert_eq!(alerts.len(), 2);
        let quantities: Vec<u32> = alerts.iter().map(|a| a.quantity).collect();
        assert!(quantities.contains(&0));
        assert!(quantities.contains(&3));
    }

    #[test]
    fn display_order_is_priority_then_days() {
        let today = date(2025, 6, 1);
        let med = medication("Amoxicillin 500mg");
        let batches = vec![
            batch_for(&med, date(2025, 6, 21), 1), // 20 days, low
            batch_for(&med, date(2025, 6, 11), 1), // 10 days, medium
            batch_for(&med, date(2025, 6, 3), 1),  // 2 days, high
            batch_for(&med, date(2025, 6, 5), 1),  // 4 days, high
        ];
        let alerts = generate(std::slice::from_ref(&med), &batches, today, 30);
        let days: Vec<i64> = alerts.iter().map(|a| a.days_until_expiry).collect();
        assert_eq!(days, vec![2, 4, 10, 20]);
    }

    #[test]
    fn reconcile_preserves_resolved_status() {
        let today = date(2025, 6, 1);
        let med = medication("Amoxicillin 500mg");
        let batches = vec![batch_for(&med, date(2025, 6, 5), 3)];

        let mut first = generate(std::slice::from_ref(&med), &batches, today, 30);
        first[0].resolve();

        let regenerated = generate(std::slice::from_ref(&med), &batches, today, 30);
        let merged = reconcile(regenerated, &first);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].status, AlertStatus::Resolved);
        assert_eq!(merged[0].id, first[0].id);
    }
}
