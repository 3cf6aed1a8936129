//! Domain error model.

use thiserror::Error;

use crate::id::{BatchId, MedicationId, SupplierId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, missing references). Infrastructure concerns belong elsewhere.
///
/// Every variant is a recoverable, caller-visible outcome: on any error path
/// the ledger and all collections are left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An outbound movement asked for more stock than is on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// Allocation was requested but no batch is active with quantity > 0.
    #[error("no eligible batches to allocate from")]
    NoEligibleBatches,

    /// A referenced medication does not exist in the catalog.
    #[error("unknown medication: {0}")]
    UnknownMedication(MedicationId),

    /// A referenced batch does not exist.
    #[error("unknown batch: {0}")]
    UnknownBatch(BatchId),

    /// A referenced supplier does not exist.
    #[error("unknown supplier: {0}")]
    UnknownSupplier(SupplierId),

    /// A value failed validation (e.g. malformed input, zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. editing an archived medication).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn insufficient_stock(requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Stable machine-checkable kind, surfaced to callers alongside the
    /// human-readable reason string.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::NoEligibleBatches => "no_eligible_batches",
            Self::UnknownMedication(_) => "unknown_medication",
            Self::UnknownBatch(_) => "unknown_batch",
            Self::UnknownSupplier(_) => "unknown_supplier",
            Self::Validation(_) => "validation",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
        }
    }
}
