//! Record Module
//!
//! The envelope every backend stores: a value plus an optional expiry instant.

use crate::store::Value;

// == Record ==
/// A stored value with its absolute expiry instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl Record {
    // == Constructor ==
    pub fn new(value: Value, expires_at: Option<u64>) -> Self {
        Self { value, expires_at }
    }

    /// A record that never expires.
    pub fn permanent(value: Value) -> Self {
        Self::new(value, None)
    }
}
