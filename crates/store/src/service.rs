//! `InventoryService`: the orchestration layer over the collection store.
//!
//! Every ledger-affecting operation runs as one uninterrupted unit (read
//! stock, validate, write stock, append ledger entry), serialized per
//! medication id. Because the store contract is whole-collection get/put, a
//! store-level write lock additionally makes each collection read-modify-write
//! cycle atomic; without it concurrent writers on different medications would
//! overwrite each other's records. Lock order is always per-medication lock
//! first, then the write lock. Advisory reads (scores, listings) take no lock
//! and may observe slightly stale snapshots.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use apotek_alerts::{generate as generate_alerts, reconcile as reconcile_alerts, ExpiryAlert};
use apotek_catalog::{Medication, MedicationDetails};
use apotek_core::{
    ActorId, AlertId, BatchId, Clock, DomainError, MedicationId, MovementId, SuggestionId,
    SupplierId,
};
use apotek_inventory::{allocate, eligible_quantity, Allocation, Batch};
use apotek_ledger::{plan_movement, verify_chain, MovementDirection, MovementKind, StockMovement};
use apotek_purchasing::{rank_suppliers, score_supplier, PurchaseOrder, SupplierPerformance};
use apotek_reorder::{
    generate as generate_suggestions, merge as merge_suggestions, ReorderSuggestion, SkipPolicy,
    SuggestionStatus,
};
use apotek_suppliers::{ContactInfo, Supplier};

use crate::collection::{collections, CollectionStore, StoreError};
use crate::config::InventoryConfig;
use crate::repository::{load_all, save_all};

/// Service-level result: domain failures or storage failures, both explicit.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Audit attribution for ledger-mutating calls, supplied by the external
/// identity collaborator. The core performs no authentication itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Input for receiving a delivery into a new batch.
#[derive(Debug, Clone)]
pub struct ReceiveStock {
    pub medication_id: MedicationId,
    pub supplier_id: SupplierId,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: u32,
    /// Purchase price per unit in smallest currency unit.
    pub purchase_price: u64,
    /// Purchase order this delivery fulfills, if any.
    pub reference_id: Option<Uuid>,
}

/// One medication whose stored stock disagrees with its ledger or batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMismatch {
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub current_stock: u32,
    pub ledger_stock: u32,
    pub batch_quantity: u32,
    /// Set when the movement chain itself is inconsistent.
    pub chain_error: Option<String>,
}

/// Result of replaying every medication's ledger against its stored state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub mismatches: Vec<StockMismatch>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Inventory intelligence core over a collection store.
pub struct InventoryService<S: CollectionStore> {
    store: S,
    clock: Arc<dyn Clock>,
    config: InventoryConfig,
    /// Per-medication write serialization: at most one in-flight mutating
    /// operation per medication id.
    locks: Mutex<HashMap<MedicationId, Arc<Mutex<()>>>>,
    /// Collection persistence is whole-collection put, so every write is a
    /// read-modify-write of the full record list. This lock makes each such
    /// cycle atomic: without it, two writers touching different medications
    /// would each rewrite the collection and the later put would drop the
    /// earlier writer's record. Always acquired after the per-medication
    /// lock, never before.
    write_lock: Mutex<()>,
}

impl<S: CollectionStore> InventoryService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, config: InventoryConfig) -> Self {
        Self {
            store,
            clock,
            config,
            locks: Mutex::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> InventoryConfig {
        self.config
    }

    fn medication_lock(&self, medication_id: MedicationId) -> ServiceResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(locks.entry(medication_id).or_default().clone())
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::storage("lock poisoned"))
    }

    // ----- catalog -----

    pub fn create_medication(
        &self,
        details: MedicationDetails,
        minimum_stock: Option<u32>,
    ) -> ServiceResult<Medication> {
        let minimum = minimum_stock.unwrap_or(self.config.low_stock_threshold_default);
        let medication = Medication::new(MedicationId::new(), details, minimum, self.clock.now())?;

        let _write = self.write_guard()?;
        let mut medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        medications.push(medication.clone());
        save_all(&self.store, collections::MEDICATIONS, &medications)?;

        info!(medication_id = %medication.id_typed(), name = medication.name(), "medication created");
        Ok(medication)
    }

    pub fn update_medication(
        &self,
        medication_id: MedicationId,
        details: MedicationDetails,
    ) -> ServiceResult<Medication> {
        self.with_medication(medication_id, |medication, now| {
            medication.update_details(details, now)
        })
    }

    pub fn set_minimum_stock(
        &self,
        medication_id: MedicationId,
        minimum_stock: u32,
    ) -> ServiceResult<Medication> {
        self.with_medication(medication_id, |medication, now| {
            medication.set_minimum_stock(minimum_stock, now)
        })
    }

    pub fn archive_medication(&self, medication_id: MedicationId) -> ServiceResult<Medication> {
        self.with_medication(medication_id, |medication, now| {
            medication.archive(now);
            Ok(())
        })
    }

    fn with_medication(
        &self,
        medication_id: MedicationId,
        edit: impl FnOnce(&mut Medication, chrono::DateTime<chrono::Utc>) -> Result<(), DomainError>,
    ) -> ServiceResult<Medication> {
        let lock = self.medication_lock(medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;

        let mut medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        let medication = medications
            .iter_mut()
            .find(|m| m.id_typed() == medication_id)
            .ok_or(DomainError::UnknownMedication(medication_id))?;
        edit(medication, self.clock.now())?;
        let updated = medication.clone();
        save_all(&self.store, collections::MEDICATIONS, &medications)?;
        Ok(updated)
    }

    pub fn medication(&self, medication_id: MedicationId) -> ServiceResult<Medication> {
        let medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        medications
            .into_iter()
            .find(|m| m.id_typed() == medication_id)
            .ok_or_else(|| DomainError::UnknownMedication(medication_id).into())
    }

    pub fn medications(&self) -> ServiceResult<Vec<Medication>> {
        Ok(load_all(&self.store, collections::MEDICATIONS)?)
    }

    // ----- suppliers & purchase history -----

    pub fn create_supplier(
        &self,
        name: impl Into<String>,
        contact: ContactInfo,
    ) -> ServiceResult<Supplier> {
        let supplier = Supplier::new(SupplierId::new(), name, contact, self.clock.now())?;
        let _write = self.write_guard()?;
        let mut suppliers: Vec<Supplier> = load_all(&self.store, collections::SUPPLIERS)?;
        suppliers.push(supplier.clone());
        save_all(&self.store, collections::SUPPLIERS, &suppliers)?;
        Ok(supplier)
    }

    pub fn suppliers(&self) -> ServiceResult<Vec<Supplier>> {
        Ok(load_all(&self.store, collections::SUPPLIERS)?)
    }

    /// Ingest one purchase-order history record. Orders are read-only input
    /// to scoring; their lifecycle is managed outside this core.
    pub fn record_purchase_order(&self, order: PurchaseOrder) -> ServiceResult<()> {
        let _write = self.write_guard()?;
        let mut orders: Vec<PurchaseOrder> = load_all(&self.store, collections::PURCHASE_ORDERS)?;
        orders.push(order);
        save_all(&self.store, collections::PURCHASE_ORDERS, &orders)?;
        Ok(())
    }

    // ----- stock ledger -----

    /// Append a movement and update the denormalized stock level.
    ///
    /// This is the only path permitted to mutate `current_stock`. On any
    /// failure no collection is touched.
    pub fn apply_movement(
        &self,
        medication_id: MedicationId,
        quantity: u32,
        kind: MovementKind,
        direction: MovementDirection,
        actor: &Actor,
        reason: impl Into<String>,
        reference_id: Option<Uuid>,
    ) -> ServiceResult<StockMovement> {
        let lock = self.medication_lock(medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;
        self.apply_movement_locked(
            medication_id,
            quantity,
            kind,
            direction,
            actor,
            reason.into(),
            reference_id,
        )
    }

    /// Caller must hold the medication's lock and the store write lock.
    fn apply_movement_locked(
        &self,
        medication_id: MedicationId,
        quantity: u32,
        kind: MovementKind,
        direction: MovementDirection,
        actor: &Actor,
        reason: String,
        reference_id: Option<Uuid>,
    ) -> ServiceResult<StockMovement> {
        let mut medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        let medication = medications
            .iter_mut()
            .find(|m| m.id_typed() == medication_id)
            .ok_or(DomainError::UnknownMedication(medication_id))?;

        let stock_before = medication.current_stock();
        let stock_after = plan_movement(stock_before, quantity, kind, direction)?;
        let now = self.clock.now();
        let movement = StockMovement {
            id: MovementId::new(),
            medication_id,
            kind,
            direction,
            quantity,
            stock_before,
            stock_after,
            occurred_at: now,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            reason,
            reference_id,
        };
        medication.apply_stock_level(stock_after, now);

        let mut movements: Vec<StockMovement> = load_all(&self.store, collections::MOVEMENTS)?;
        movements.push(movement.clone());
        save_all(&self.store, collections::MOVEMENTS, &movements)?;
        save_all(&self.store, collections::MEDICATIONS, &medications)?;

        info!(
            medication_id = %medication_id,
            kind = kind.as_str(),
            quantity,
            stock_after,
            actor = movement.actor_name.as_str(),
            "stock movement applied"
        );
        Ok(movement)
    }

    /// Receive a delivery: creates a batch and applies the matching `In`
    /// movement as one serialized unit.
    pub fn receive_stock(
        &self,
        input: ReceiveStock,
        actor: &Actor,
    ) -> ServiceResult<(Batch, StockMovement)> {
        let lock = self.medication_lock(input.medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;

        let suppliers: Vec<Supplier> = load_all(&self.store, collections::SUPPLIERS)?;
        if !suppliers.iter().any(|s| s.id_typed() == input.supplier_id) {
            return Err(DomainError::UnknownSupplier(input.supplier_id).into());
        }

        let batch = Batch::new(
            BatchId::new(),
            input.medication_id,
            input.batch_number,
            input.expiry_date,
            input.quantity,
            input.purchase_price,
            self.clock.now(),
            input.supplier_id,
        )?;

        // Movement first: it validates the medication exists and is not the
        // victim of a partial write if planning fails.
        let movement = self.apply_movement_locked(
            input.medication_id,
            input.quantity,
            MovementKind::In,
            MovementDirection::Inbound,
            actor,
            format!("received batch {}", batch.batch_number()),
            input.reference_id,
        )?;

        let mut batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;
        batches.push(batch.clone());
        save_all(&self.store, collections::BATCHES, &batches)?;

        Ok((batch, movement))
    }

    /// Point-of-sale dispensing: FEFO allocation applied all-or-nothing.
    /// Partial fulfillment is rejected here; see `transfer_out` for the
    /// policy that accepts it.
    pub fn dispense(
        &self,
        medication_id: MedicationId,
        quantity: u32,
        actor: &Actor,
        reason: impl Into<String>,
        reference_id: Option<Uuid>,
    ) -> ServiceResult<(Allocation, StockMovement)> {
        let lock = self.medication_lock(medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;
        self.medication(medication_id)?;

        let today = self.clock.today();
        let mut batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;
        let own: Vec<Batch> = batches
            .iter()
            .filter(|b| b.medication_id() == medication_id)
            .cloned()
            .collect();

        let available = eligible_quantity(&own, today);
        if available == 0 {
            return Err(DomainError::NoEligibleBatches.into());
        }
        if available < quantity {
            return Err(DomainError::insufficient_stock(quantity, available).into());
        }

        let allocation = allocate(&own, quantity, today);
        debug_assert!(allocation.is_complete());

        for line in &allocation.lines {
            let batch = batches
                .iter_mut()
                .find(|b| b.id_typed() == line.batch_id)
                .ok_or(DomainError::UnknownBatch(line.batch_id))?;
            batch.deduct(line.quantity)?;
        }

        let movement = self.apply_movement_locked(
            medication_id,
            quantity,
            MovementKind::Out,
            MovementDirection::Outbound,
            actor,
            reason.into(),
            reference_id,
        )?;
        save_all(&self.store, collections::BATCHES, &batches)?;

        Ok((allocation, movement))
    }

    /// Transfer stock out (to another location). Partial fulfillment is
    /// accepted: the movement covers whatever eligible stock could be
    /// allocated, and the returned allocation reports the shortfall.
    pub fn transfer_out(
        &self,
        medication_id: MedicationId,
        quantity: u32,
        actor: &Actor,
        reason: impl Into<String>,
        reference_id: Option<Uuid>,
    ) -> ServiceResult<(Allocation, StockMovement)> {
        let lock = self.medication_lock(medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;
        self.medication(medication_id)?;

        let today = self.clock.today();
        let mut batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;
        let own: Vec<Batch> = batches
            .iter()
            .filter(|b| b.medication_id() == medication_id)
            .cloned()
            .collect();

        let allocation = allocate(&own, quantity, today);
        if allocation.allocated() == 0 {
            return Err(DomainError::NoEligibleBatches.into());
        }
        if !allocation.is_complete() {
            warn!(
                medication_id = %medication_id,
                requested = quantity,
                shortfall = allocation.shortfall,
                "partial transfer"
            );
        }

        for line in &allocation.lines {
            let batch = batches
                .iter_mut()
                .find(|b| b.id_typed() == line.batch_id)
                .ok_or(DomainError::UnknownBatch(line.batch_id))?;
            batch.deduct(line.quantity)?;
        }

        let movement = self.apply_movement_locked(
            medication_id,
            allocation.allocated(),
            MovementKind::Transfer,
            MovementDirection::Outbound,
            actor,
            reason.into(),
            reference_id,
        )?;
        save_all(&self.store, collections::BATCHES, &batches)?;

        Ok((allocation, movement))
    }

    /// Customer return into an existing batch.
    pub fn record_return(
        &self,
        medication_id: MedicationId,
        batch_id: BatchId,
        quantity: u32,
        actor: &Actor,
        reason: impl Into<String>,
        reference_id: Option<Uuid>,
    ) -> ServiceResult<StockMovement> {
        let lock = self.medication_lock(medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;

        let mut batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;
        let batch = batches
            .iter_mut()
            .find(|b| b.id_typed() == batch_id)
            .ok_or(DomainError::UnknownBatch(batch_id))?;
        if batch.medication_id() != medication_id {
            return Err(DomainError::validation("batch belongs to a different medication").into());
        }
        batch.restock(quantity)?;

        let movement = self.apply_movement_locked(
            medication_id,
            quantity,
            MovementKind::Return,
            MovementDirection::Inbound,
            actor,
            reason.into(),
            reference_id,
        )?;
        save_all(&self.store, collections::BATCHES, &batches)?;

        Ok(movement)
    }

    /// Stock-opname correction: align recorded stock with a physical count.
    ///
    /// Returns `None` when the count already matches. Downward corrections
    /// drain batches oldest-expiry-first, expired batches included (disposal
    /// is the usual reason to count down); upward corrections restock the
    /// most recently received batch.
    pub fn adjust_stock(
        &self,
        medication_id: MedicationId,
        counted_stock: u32,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> ServiceResult<Option<StockMovement>> {
        let lock = self.medication_lock(medication_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::storage("lock poisoned"))?;
        let _write = self.write_guard()?;

        let medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        let medication = medications
            .iter()
            .find(|m| m.id_typed() == medication_id)
            .ok_or(DomainError::UnknownMedication(medication_id))?;
        let recorded = medication.current_stock();

        if counted_stock == recorded {
            info!(medication_id = %medication_id, "stock opname found no difference");
            return Ok(None);
        }

        let mut batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;

        if counted_stock > recorded {
            let surplus = counted_stock - recorded;
            let target = batches
                .iter_mut()
                .filter(|b| b.medication_id() == medication_id)
                .max_by_key(|b| b.received_at())
                .ok_or_else(|| {
                    DomainError::validation("no batch to absorb an upward adjustment")
                })?;
            target.restock(surplus)?;

            let movement = self.apply_movement_locked(
                medication_id,
                surplus,
                MovementKind::Adjustment,
                MovementDirection::Inbound,
                actor,
                reason.into(),
                None,
            )?;
            save_all(&self.store, collections::BATCHES, &batches)?;
            Ok(Some(movement))
        } else {
            let mut remaining = recorded - counted_stock;
            let mut own: Vec<&mut Batch> = batches
                .iter_mut()
                .filter(|b| b.medication_id() == medication_id && b.quantity() > 0)
                .collect();
            own.sort_by_key(|b| (b.expiry_date(), b.id_typed()));
            for batch in own {
                if remaining == 0 {
                    break;
                }
                let take = batch.quantity().min(remaining);
                batch.deduct(take)?;
                remaining -= take;
            }

            let movement = self.apply_movement_locked(
                medication_id,
                recorded - counted_stock,
                MovementKind::Adjustment,
                MovementDirection::Outbound,
                actor,
                reason.into(),
                None,
            )?;
            save_all(&self.store, collections::BATCHES, &batches)?;
            Ok(Some(movement))
        }
    }

    pub fn movements_for(&self, medication_id: MedicationId) -> ServiceResult<Vec<StockMovement>> {
        let movements: Vec<StockMovement> = load_all(&self.store, collections::MOVEMENTS)?;
        Ok(movements
            .into_iter()
            .filter(|m| m.medication_id == medication_id)
            .collect())
    }

    pub fn batches_for(&self, medication_id: MedicationId) -> ServiceResult<Vec<Batch>> {
        let batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;
        Ok(batches
            .into_iter()
            .filter(|b| b.medication_id() == medication_id)
            .collect())
    }

    // ----- derived state: alerts, performance, suggestions -----

    /// Regenerate expiry alerts from batch state, reconcile against the
    /// persisted snapshots by batch id, persist, and return them most urgent
    /// first. Persisted snapshots are advisory and may go stale between
    /// refreshes.
    pub fn refresh_expiry_alerts(&self) -> ServiceResult<Vec<ExpiryAlert>> {
        let _write = self.write_guard()?;
        let medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        let batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;
        let persisted: Vec<ExpiryAlert> = load_all(&self.store, collections::ALERTS)?;

        let fresh = generate_alerts(
            &medications,
            &batches,
            self.clock.today(),
            self.config.expiry_warning_days,
        );
        let merged = reconcile_alerts(fresh, &persisted);
        save_all(&self.store, collections::ALERTS, &merged)?;

        info!(count = merged.len(), "expiry alerts refreshed");
        Ok(merged)
    }

    pub fn resolve_alert(&self, alert_id: AlertId) -> ServiceResult<ExpiryAlert> {
        let _write = self.write_guard()?;
        let mut alerts: Vec<ExpiryAlert> = load_all(&self.store, collections::ALERTS)?;
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(DomainError::NotFound)?;
        alert.resolve();
        let resolved = alert.clone();
        save_all(&self.store, collections::ALERTS, &alerts)?;
        Ok(resolved)
    }

    pub fn alerts(&self) -> ServiceResult<Vec<ExpiryAlert>> {
        Ok(load_all(&self.store, collections::ALERTS)?)
    }

    pub fn supplier_performance(
        &self,
        supplier_id: SupplierId,
    ) -> ServiceResult<SupplierPerformance> {
        let suppliers: Vec<Supplier> = load_all(&self.store, collections::SUPPLIERS)?;
        let supplier = suppliers
            .iter()
            .find(|s| s.id_typed() == supplier_id)
            .ok_or(DomainError::UnknownSupplier(supplier_id))?;
        let orders: Vec<PurchaseOrder> = load_all(&self.store, collections::PURCHASE_ORDERS)?;
        Ok(score_supplier(supplier, &orders))
    }

    /// Score every supplier and rank for display (best quality first).
    pub fn rank_supplier_performance(&self) -> ServiceResult<Vec<SupplierPerformance>> {
        let suppliers: Vec<Supplier> = load_all(&self.store, collections::SUPPLIERS)?;
        let orders: Vec<PurchaseOrder> = load_all(&self.store, collections::PURCHASE_ORDERS)?;
        let performances = suppliers
            .iter()
            .map(|s| score_supplier(s, &orders))
            .collect();
        Ok(rank_suppliers(performances))
    }

    /// Regenerate reorder suggestions and merge with the persisted set by
    /// medication id, preserving prior ordered/dismissed decisions.
    pub fn refresh_reorder_suggestions(
        &self,
        policy: SkipPolicy,
    ) -> ServiceResult<Vec<ReorderSuggestion>> {
        let _write = self.write_guard()?;
        let medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        let suppliers: Vec<Supplier> = load_all(&self.store, collections::SUPPLIERS)?;
        let orders: Vec<PurchaseOrder> = load_all(&self.store, collections::PURCHASE_ORDERS)?;
        let existing: Vec<ReorderSuggestion> =
            load_all(&self.store, collections::REORDER_SUGGESTIONS)?;

        let fresh = generate_suggestions(&medications, &suppliers, &orders, self.clock.now(), policy);
        let merged = merge_suggestions(fresh, &existing);
        save_all(&self.store, collections::REORDER_SUGGESTIONS, &merged)?;

        info!(count = merged.len(), "reorder suggestions refreshed");
        Ok(merged)
    }

    pub fn mark_suggestion_ordered(
        &self,
        suggestion_id: SuggestionId,
    ) -> ServiceResult<ReorderSuggestion> {
        self.set_suggestion_status(suggestion_id, SuggestionStatus::Ordered)
    }

    pub fn dismiss_suggestion(
        &self,
        suggestion_id: SuggestionId,
    ) -> ServiceResult<ReorderSuggestion> {
        self.set_suggestion_status(suggestion_id, SuggestionStatus::Dismissed)
    }

    fn set_suggestion_status(
        &self,
        suggestion_id: SuggestionId,
        status: SuggestionStatus,
    ) -> ServiceResult<ReorderSuggestion> {
        let _write = self.write_guard()?;
        let mut suggestions: Vec<ReorderSuggestion> =
            load_all(&self.store, collections::REORDER_SUGGESTIONS)?;
        let suggestion = suggestions
            .iter_mut()
            .find(|s| s.id == suggestion_id)
            .ok_or(DomainError::NotFound)?;
        suggestion.status = status;
        let updated = suggestion.clone();
        save_all(&self.store, collections::REORDER_SUGGESTIONS, &suggestions)?;
        Ok(updated)
    }

    pub fn reorder_suggestions(&self) -> ServiceResult<Vec<ReorderSuggestion>> {
        Ok(load_all(&self.store, collections::REORDER_SUGGESTIONS)?)
    }

    // ----- reconciliation -----

    /// Check every medication's stored stock against its ledger replay and
    /// the sum of its batch quantities. Derived fields are caches; this is
    /// the audit that they have not drifted. Run in tests and optionally at
    /// startup.
    pub fn reconcile(&self) -> ServiceResult<ReconciliationReport> {
        // Snapshot under the write lock so a mid-flight mutation cannot show
        // up as a spurious mismatch.
        let _write = self.write_guard()?;
        let medications: Vec<Medication> = load_all(&self.store, collections::MEDICATIONS)?;
        let movements: Vec<StockMovement> = load_all(&self.store, collections::MOVEMENTS)?;
        let batches: Vec<Batch> = load_all(&self.store, collections::BATCHES)?;

        let mut report = ReconciliationReport::default();
        for medication in &medications {
            let own: Vec<StockMovement> = movements
                .iter()
                .filter(|m| m.medication_id == medication.id_typed())
                .cloned()
                .collect();
            let batch_quantity: u32 = batches
                .iter()
                .filter(|b| b.medication_id() == medication.id_typed())
                .map(Batch::quantity)
                .sum();

            let (ledger_stock, chain_error) = match verify_chain(&own) {
                Ok(stock) => (stock, None),
                Err(e) => (0, Some(e.to_string())),
            };

            if chain_error.is_some()
                || ledger_stock != medication.current_stock()
                || batch_quantity != medication.current_stock()
            {
                warn!(
                    medication_id = %medication.id_typed(),
                    current_stock = medication.current_stock(),
                    ledger_stock,
                    batch_quantity,
                    "stock reconciliation mismatch"
                );
                report.mismatches.push(StockMismatch {
                    medication_id: medication.id_typed(),
                    medication_name: medication.name().to_string(),
                    current_stock: medication.current_stock(),
                    ledger_stock,
                    batch_quantity,
                    chain_error,
                });
            }
        }
        Ok(report)
    }
}
