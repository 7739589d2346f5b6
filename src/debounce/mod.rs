//! Debounce Module
//!
//! Per-key write coalescing in front of any raw store.

mod coalescer;
mod rules;
mod stats;

pub use coalescer::Debounced;
pub use rules::{DebounceRule, DebounceRules, KeyMatcher};
pub use stats::DebounceStats;
