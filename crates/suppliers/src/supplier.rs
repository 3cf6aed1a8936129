use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use apotek_core::{DomainError, DomainResult, Entity, SupplierId};

/// Supplier status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    Active,
    Suspended,
}

/// Contact information for a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Entity: Supplier.
///
/// Reliability is never stored here; it is recomputed from purchase-order
/// history by the performance scorer each time it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    contact: ContactInfo,
    status: SupplierStatus,
    created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(
        id: SupplierId,
        name: impl Into<String>,
        contact: ContactInfo,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            contact,
            status: SupplierStatus::Active,
            created_at,
        })
    }

    pub fn id_typed(&self) -> SupplierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn status(&self) -> SupplierStatus {
        self.status
    }

    pub fn suspend(&mut self) {
        self.status = SupplierStatus::Suspended;
    }

    pub fn reinstate(&mut self) {
        self.status = SupplierStatus::Active;
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
