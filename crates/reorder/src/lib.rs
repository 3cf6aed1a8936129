//! Reorder suggestion engine.
//!
//! Combines low-stock detection with supplier performance scores to
//! recommend what to buy, how much, and from whom. Suggestions are derived
//! state: regenerating merges by medication id and never resurrects a
//! dismissed suggestion as pending.

pub mod suggestion;

pub use suggestion::{
    generate, merge, select_supplier, suggested_quantity, RecommendedSupplier, ReorderSuggestion,
    SkipPolicy, SuggestionPriority, SuggestionStatus,
};
