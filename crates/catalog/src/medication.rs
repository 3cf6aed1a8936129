use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use apotek_core::{DomainError, DomainResult, Entity, MedicationId};

/// Medication lifecycle. Catalog entries are never deleted, only archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    Active,
    Archived,
}

/// Descriptive catalog fields, editable as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationDetails {
    pub name: String,
    pub category: String,
    /// Dosage form (tablet, syrup, ...).
    pub form: String,
    /// Dispensing unit (strip, bottle, ...).
    pub unit: String,
    /// Purchase price in smallest currency unit.
    pub purchase_price: u64,
    /// Sale price in smallest currency unit.
    pub sale_price: u64,
}

impl MedicationDetails {
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.unit.trim().is_empty() {
            return Err(DomainError::validation("unit cannot be empty"));
        }
        Ok(())
    }
}

/// Entity: Medication.
///
/// `current_stock` is denormalized: it must equal the ledger replay and the
/// sum of active, non-expired batch quantities. Only the stock ledger path
/// may change it (`apply_stock_level`); any other write is a correctness bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    id: MedicationId,
    #[serde(flatten)]
    details: MedicationDetails,
    minimum_stock: u32,
    current_stock: u32,
    status: MedicationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Medication {
    /// Create a new catalog entry with zero stock.
    pub fn new(
        id: MedicationId,
        details: MedicationDetails,
        minimum_stock: u32,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id,
            details,
            minimum_stock,
            current_stock: 0,
            status: MedicationStatus::Active,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn id_typed(&self) -> MedicationId {
        self.id
    }

    pub fn details(&self) -> &MedicationDetails {
        &self.details
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn minimum_stock(&self) -> u32 {
        self.minimum_stock
    }

    pub fn current_stock(&self) -> u32 {
        self.current_stock
    }

    pub fn status(&self) -> MedicationStatus {
        self.status
    }

    pub fn is_archived(&self) -> bool {
        self.status == MedicationStatus::Archived
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stock on hand relative to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }

    /// `current_stock / minimum_stock`; a threshold of zero counts as fully
    /// depleted (ratio 0) so zero-threshold entries still sort first.
    pub fn stock_ratio(&self) -> f64 {
        if self.minimum_stock == 0 {
            return 0.0;
        }
        f64::from(self.current_stock) / f64::from(self.minimum_stock)
    }

    /// Explicit catalog edit (name, prices, ...). Rejected once archived.
    pub fn update_details(
        &mut self,
        details: MedicationDetails,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_archived() {
            return Err(DomainError::conflict("medication is archived"));
        }
        details.validate()?;
        self.details = details;
        self.updated_at = now;
        Ok(())
    }

    /// Change the reorder threshold.
    pub fn set_minimum_stock(&mut self, minimum_stock: u32, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_archived() {
            return Err(DomainError::conflict("medication is archived"));
        }
        self.minimum_stock = minimum_stock;
        self.updated_at = now;
        Ok(())
    }

    /// Soft-deactivate. Idempotent; history and stock are retained.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        if self.status != MedicationStatus::Archived {
            self.status = MedicationStatus::Archived;
            self.updated_at = now;
        }
    }

    /// Ledger-only write path for the denormalized stock level.
    ///
    /// Callers outside the stock ledger must go through
    /// `InventoryService::apply_movement` instead of calling this directly.
    pub fn apply_stock_level(&mut self, stock_after: u32, now: DateTime<Utc>) {
        self.current_stock = stock_after;
        self.updated_at = now;
    }
}

impl Entity for Medication {
    type Id = MedicationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
