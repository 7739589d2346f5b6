//! Store Module
//!
//! Contracts shared by every backend: records, the value codec, expiry,
//! namespace keying, the raw store capability and the value-level facade.

pub mod codec;
mod expiry;
mod facade;
mod namespace;
mod raw;
mod record;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::{Value, MISSING_SENTINEL};
pub use expiry::{Clock, ExpiryPolicy, Freshness, ManualClock, SystemClock};
pub use facade::{Store, StoreOptions, SyncStore};
pub use namespace::{is_isolated_namespace, NamespaceKeyer, DEFAULT_NAMESPACE};
pub use raw::{RawStore, RawStoreSync, SyncAdapter};
pub use record::Record;
