//! In-Memory Backend
//!
//! A shared in-process table holding records of any number of namespaces
//! under `"<namespace>:<key>"` physical keys.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::store::{ExpiryPolicy, Freshness, NamespaceKeyer, RawStoreSync, Record};

// == Memory Table ==
/// Clonable handle to one physical in-process map.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    entries: Arc<RwLock<HashMap<String, Record>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical entries across every namespace (including expired).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// == Memory Store ==
/// One namespace's view of a [`MemoryTable`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    table: MemoryTable,
    keyer: NamespaceKeyer,
    expiry: ExpiryPolicy,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new(table: MemoryTable, namespace: impl Into<String>, expiry: ExpiryPolicy) -> Self {
        Self {
            table,
            keyer: NamespaceKeyer::new(namespace),
            expiry,
        }
    }

    pub fn namespace(&self) -> &str {
        self.keyer.namespace()
    }

    // == Length ==
    /// Entries held for this namespace (including expired, not yet evicted).
    pub fn len(&self) -> usize {
        self.table
            .entries
            .read()
            .keys()
            .filter(|key| self.keyer.owns(key))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RawStoreSync for MemoryStore {
    fn import(&self, key: &str, record: Record) -> Result<()> {
        self.table
            .entries
            .write()
            .insert(self.keyer.attach(key), record);
        Ok(())
    }

    fn export(&self, key: &str) -> Result<Option<Record>> {
        let physical = self.keyer.attach(key);
        let record = self.table.entries.read().get(&physical).cloned();

        match self.expiry.check(record) {
            Freshness::Expired => {
                debug!(namespace = %self.keyer, key, "evicting expired record");
                self.table.entries.write().remove(&physical);
                Ok(None)
            }
            freshness => Ok(freshness.into_record()),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.table.entries.write().remove(&self.keyer.attach(key));
        Ok(())
    }

    // == Clear ==
    /// Scans the whole table and drops this namespace's entries.
    fn clear(&self) -> Result<()> {
        self.table
            .entries
            .write()
            .retain(|physical, _| !self.keyer.owns(physical));
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ManualClock, Value};
    use std::time::Duration;

    fn store_with_clock(table: &MemoryTable, namespace: &str) -> (Arc<ManualClock>, MemoryStore) {
        let clock = Arc::new(ManualClock::new(10_000));
        let store = MemoryStore::new(table.clone(), namespace, ExpiryPolicy::new(clock.clone()));
        (clock, store)
    }

    #[test]
    fn test_import_and_export() {
        let table = MemoryTable::new();
        let (_, store) = store_with_clock(&table, "ns");

        store
            .import("k", Record::permanent(Value::from("v")))
            .unwrap();

        assert_eq!(
            store.export("k").unwrap(),
            Some(Record::permanent(Value::from("v")))
        );
        assert_eq!(store.export("missing").unwrap(), None);
    }

    #[test]
    fn test_overwrite() {
        let table = MemoryTable::new();
        let (_, store) = store_with_clock(&table, "ns");

        store.import("k", Record::permanent(Value::from(1))).unwrap();
        store.import("k", Record::permanent(Value::from(2))).unwrap();

        assert_eq!(store.export("k").unwrap().unwrap().value, Value::from(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_expired_record_is_evicted_on_read() {
        let table = MemoryTable::new();
        let (clock, store) = store_with_clock(&table, "ns");

        store
            .import("k", Record::new(Value::from("v"), Some(10_100)))
            .unwrap();
        assert!(store.export("k").unwrap().is_some());

        clock.advance(Duration::from_millis(100));

        // Still physically present until someone reads it
        assert_eq!(table.len(), 1);
        assert_eq!(store.export("k").unwrap(), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_delete_nonexistent() {
        let table = MemoryTable::new();
        let (_, store) = store_with_clock(&table, "ns");

        store.import("k", Record::permanent(Value::Null)).unwrap();
        store.delete("does-not-exist").unwrap();

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_is_scoped_to_namespace() {
        let table = MemoryTable::new();
        let (_, a) = store_with_clock(&table, "a");
        let (_, ab) = store_with_clock(&table, "ab");

        a.import("1", Record::permanent(Value::from("a1"))).unwrap();
        a.import("2", Record::permanent(Value::from("a2"))).unwrap();
        ab.import("1", Record::permanent(Value::from("ab1"))).unwrap();

        a.clear().unwrap();

        assert!(a.is_empty());
        assert_eq!(a.export("1").unwrap(), None);
        assert_eq!(ab.export("1").unwrap().unwrap().value, Value::from("ab1"));
        assert_eq!(table.len(), 1);
    }
}
