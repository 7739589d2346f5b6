//! Expiry Module
//!
//! Clock capability and the TTL policy every store evaluates lazily on read.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::store::Record;

// == Clock ==
/// Source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// == Expiry Policy ==
/// Converts relative TTLs into absolute instants and judges expiry.
#[derive(Debug, Clone)]
pub struct ExpiryPolicy {
    clock: Arc<dyn Clock>,
}

impl ExpiryPolicy {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Expires At ==
    /// Absolute expiry instant for a TTL, or `None` when no TTL is given.
    pub fn expires_at(&self, ttl: Option<Duration>) -> Option<u64> {
        ttl.map(|ttl| {
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            self.now_ms().saturating_add(millis)
        })
    }

    // == Is Expired ==
    /// A record expires once the current time reaches its expiry instant.
    pub fn is_expired(&self, expires_at: Option<u64>) -> bool {
        match expires_at {
            Some(expires) => expires <= self.now_ms(),
            None => false,
        }
    }

    // == Remaining ==
    /// Lifetime left before `expires_at`, zero once it has passed.
    pub fn remaining(&self, expires_at: Option<u64>) -> Option<Duration> {
        expires_at.map(|expires| Duration::from_millis(expires.saturating_sub(self.now_ms())))
    }

    // == Check ==
    /// Screens a record read from a backend.
    ///
    /// Live records come back as `Live`; expired ones as `Expired`, which the
    /// caller must answer with a physical delete before reporting absence.
    pub fn check(&self, record: Option<Record>) -> Freshness {
        match record {
            None => Freshness::Absent,
            Some(record) if self.is_expired(record.expires_at) => Freshness::Expired,
            Some(record) => Freshness::Live(record),
        }
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

/// Outcome of [`ExpiryPolicy::check`].
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    Absent,
    Expired,
    Live(Record),
}

impl Freshness {
    pub fn into_record(self) -> Option<Record> {
        match self {
            Freshness::Live(record) => Some(record),
            Freshness::Absent | Freshness::Expired => None,
        }
    }
}
