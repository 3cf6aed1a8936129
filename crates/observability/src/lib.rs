//! Tracing/logging (shared setup).
//!
//! The workspace has no binary; embedding applications, tests, and benches
//! call `init` (or `init_with_filter` for a quiet default) before exercising
//! the service.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with explicit fallback filter directives (used when `RUST_LOG`
/// is unset).
pub fn init_with_filter(default_directives: &str) {
    tracing::init_with_filter(default_directives);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
