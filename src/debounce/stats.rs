//! Debounce Statistics Module
//!
//! Counts how a debouncing store served reads and flushed writes.

use serde::Serialize;

// == Debounce Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DebounceStats {
    /// Debounced reads answered from the shadow cache
    pub shadow_hits: u64,
    /// Debounced reads that went to the backing store
    pub read_throughs: u64,
    /// Deferred writes replayed against the backing store
    pub flushes: u64,
    /// Deferred writes replaced before they were flushed
    pub superseded: u64,
    /// Deferred writes the backing store rejected
    pub flush_failures: u64,
    /// Timers currently waiting to fire
    pub pending: usize,
}

impl DebounceStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Shadow Hit Rate ==
    /// shadow_hits / (shadow_hits + read_throughs), or 0.0 with no debounced reads.
    pub fn shadow_hit_rate(&self) -> f64 {
        let total = self.shadow_hits + self.read_throughs;
        if total == 0 {
            0.0
        } else {
            self.shadow_hits as f64 / total as f64
        }
    }

    pub fn record_shadow_hit(&mut self) {
        self.shadow_hits += 1;
    }

    pub fn record_read_through(&mut self) {
        self.read_throughs += 1;
    }

    pub fn record_flush(&mut self) {
        self.flushes += 1;
    }

    pub fn record_superseded(&mut self) {
        self.superseded += 1;
    }

    pub fn record_flush_failure(&mut self) {
        self.flush_failures += 1;
    }

    /// Sums counters of several stores.
    pub fn merge(&mut self, other: &DebounceStats) {
        self.shadow_hits += other.shadow_hits;
        self.read_throughs += other.read_throughs;
        self.flushes += other.flushes;
        self.superseded += other.superseded;
        self.flush_failures += other.flush_failures;
        self.pending += other.pending;
    }
}
