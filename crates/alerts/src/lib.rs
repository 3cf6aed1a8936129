//! Expiry alert generation.
//!
//! Alerts are a disposable read model derived from batch state: regenerated
//! on demand, rebuildable at any time, and advisory once persisted. Resolving
//! an alert changes only its status; batch and stock state are untouched.

pub mod alert;

pub use alert::{
    generate, priority_for, reconcile, sort_for_display, AlertPriority, AlertStatus, ExpiryAlert,
};
