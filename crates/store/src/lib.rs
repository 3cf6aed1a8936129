//! Storage boundary and service orchestration.
//!
//! The persistent store is a key-collection contract: whole JSON-record
//! collections in, whole collections out. Everything smarter than that
//! (id lookups, per-medication write serialization, derived-state refreshes)
//! lives on this side of the boundary.

pub mod collection;
pub mod config;
pub mod in_memory;
pub mod repository;
pub mod service;


pub use collection::{collections, CollectionStore, StoreError};
pub use config::InventoryConfig;
pub use in_memory::InMemoryStore;
pub use service::{
    Actor, InventoryService, ReceiveStock, ReconciliationReport, ServiceError, ServiceResult,
    StockMismatch,
};
