use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use apotek_core::{ActorId, DomainError, DomainResult, MedicationId, MovementId};

/// Stock movement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
    Transfer,
    Return,
    /// Stock-opname correction; the only kind that can go either direction.
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
            MovementKind::Transfer => "transfer",
            MovementKind::Return => "return",
            MovementKind::Adjustment => "adjustment",
        }
    }

    /// The direction this kind is constrained to, if any.
    pub fn fixed_direction(&self) -> Option<MovementDirection> {
        match self {
            MovementKind::In | MovementKind::Return => Some(MovementDirection::Inbound),
            MovementKind::Out | MovementKind::Transfer => Some(MovementDirection::Outbound),
            MovementKind::Adjustment => None,
        }
    }
}

/// Whether a movement adds to or removes from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    Inbound,
    Outbound,
}

/// One immutable ledger entry.
///
/// The sequence of entries for a medication, replayed in order, reconstructs
/// its current stock exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub medication_id: MedicationId,
    pub kind: MovementKind,
    pub direction: MovementDirection,
    pub quantity: u32,
    pub stock_before: u32,
    pub stock_after: u32,
    pub occurred_at: DateTime<Utc>,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub reason: String,
    /// Order/session that caused the movement, if any.
    pub reference_id: Option<Uuid>,
}

/// Decide the stock level after a movement, without applying anything.
///
/// - quantity must be positive
/// - kind and direction must agree (`in`/`return` inbound, `out`/`transfer`
///   outbound, `adjustment` either)
/// - outbound movements exceeding available stock fail with
///   `InsufficientStock`; nothing is written on any failure path
pub fn plan_movement(
    stock_before: u32,
    quantity: u32,
    kind: MovementKind,
    direction: MovementDirection,
) -> DomainResult<u32> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    if let Some(fixed) = kind.fixed_direction() {
        if fixed != direction {
            return Err(DomainError::validation(format!(
                "movement kind '{}' cannot be {:?}",
                kind.as_str(),
                direction
            )));
        }
    }

    match direction {
        MovementDirection::Inbound => stock_before
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock level overflow")),
        MovementDirection::Outbound => {
            if stock_before < quantity {
                return Err(DomainError::insufficient_stock(quantity, stock_before));
            }
            Ok(stock_before - quantity)
        }
    }
}

/// Reconstruct the stock level implied by an ordered slice of movements,
/// starting from zero. Deltas only; the recorded before/after fields are
/// ignored here (see `verify_chain` for the audit check).
pub fn replay(movements: &[StockMovement]) -> u32 {
    movements.iter().fold(0u32, |stock, m| match m.direction {
        MovementDirection::Inbound => stock.saturating_add(m.quantity),
        MovementDirection::Outbound => stock.saturating_sub(m.quantity),
    })
}

/// Audit an ordered movement chain: every entry's `stock_before` must equal
/// the running stock and `stock_after` must equal `stock_before` adjusted by
/// the entry's delta. Returns the final stock on success.
pub fn verify_chain(movements: &[StockMovement]) -> DomainResult<u32> {
    let mut stock: u32 = 0;
    for m in movements {
        if m.stock_before != stock {
            return Err(DomainError::invariant(format!(
                "movement {} stock_before {} does not match running stock {}",
                m.id, m.stock_before, stock
            )));
        }
        let expected_after = match m.direction {
            MovementDirection::Inbound => stock
                .checked_add(m.quantity)
                .ok_or_else(|| DomainError::invariant("stock level overflow"))?,
            MovementDirection::Outbound => stock.checked_sub(m.quantity).ok_or_else(|| {
                DomainError::invariant(format!("movement {} drives stock negative", m.id))
            })?,
        };
        if m.stock_after != expected_after {
            return Err(DomainError::invariant(format!(
                "movement {} stock_after {} does not match expected {}",
                m.id, m.stock_after, expected_after
            )));
        }
        stock = expected_after;
    }
    Ok(stock)
}
