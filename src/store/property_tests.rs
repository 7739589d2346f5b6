//! Property-Based Tests for the Store Module
//!
//! Uses proptest to check codec, namespace and coalescing guarantees.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::{MemoryStore, MemoryTable};
use crate::debounce::{DebounceRules, Debounced};
use crate::store::{codec, ExpiryPolicy, RawStore, RawStoreSync, Record, SyncAdapter, Value};

// == Strategies ==
/// Generates valid keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,32}".prop_map(|s| s)
}

/// Generates nested values mixing every variant, `Missing` included
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Missing),
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|fields: BTreeMap<String, Value>| Value::Object(fields)),
        ]
    })
}

fn memory_store(table: &MemoryTable, namespace: &str) -> MemoryStore {
    MemoryStore::new(table.clone(), namespace, ExpiryPolicy::default())
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Decoding an encoded value yields the same value, Missing included.
    #[test]
    fn prop_codec_roundtrip(value in value_strategy()) {
        let text = codec::serialize(&value).unwrap();
        prop_assert_eq!(codec::deserialize(&text).unwrap(), value);
    }

    // Importing a record then exporting it (before expiry) returns it unchanged.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let store = memory_store(&MemoryTable::new(), "ns");

        store.import(&key, Record::permanent(value.clone())).unwrap();

        prop_assert_eq!(store.export(&key).unwrap(), Some(Record::permanent(value)));
    }

    // The second of two writes to a key is the one that stays.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy()
    ) {
        let store = memory_store(&MemoryTable::new(), "ns");

        store.import(&key, Record::permanent(first)).unwrap();
        store.import(&key, Record::permanent(second.clone())).unwrap();

        prop_assert_eq!(store.export(&key).unwrap().map(|r| r.value), Some(second));
        prop_assert_eq!(store.len(), 1);
    }

    // Clearing one namespace leaves every key of another namespace intact.
    #[test]
    fn prop_clear_isolates_namespaces(
        keys_a in prop::collection::hash_set(key_strategy(), 1..20),
        keys_b in prop::collection::hash_set(key_strategy(), 1..20)
    ) {
        let table = MemoryTable::new();
        let a = memory_store(&table, "a");
        let b = memory_store(&table, "b");

        for key in &keys_a {
            a.import(key, Record::permanent(Value::from("a"))).unwrap();
        }
        for key in &keys_b {
            b.import(key, Record::permanent(Value::from("b"))).unwrap();
        }

        a.clear().unwrap();

        prop_assert!(a.is_empty());
        prop_assert_eq!(b.len(), keys_b.len());
        for key in &keys_b {
            prop_assert_eq!(b.export(key).unwrap().map(|r| r.value), Some(Value::from("b")));
        }
        prop_assert_eq!(table.len(), keys_b.len());
    }

    // A burst of writes inside one window produces one flush carrying the last value.
    #[test]
    fn prop_burst_flushes_last_write(
        values in prop::collection::vec(value_strategy(), 1..10),
        gap_ms in 0u64..50
    ) {
        let runtime = paused_runtime();
        let table = MemoryTable::new();
        let backing = Arc::new(SyncAdapter::new(memory_store(&table, "ns")));
        let rules = DebounceRules::new()
            .with_rule("k", Duration::from_millis(100))
            .unwrap();
        let store = Debounced::new(backing.clone(), rules, "ns", ExpiryPolicy::default());

        let last = values.last().cloned().unwrap();
        runtime.block_on(async {
            for value in values.iter().cloned() {
                store.import("k", Record::permanent(value)).await.unwrap();
                tokio::time::sleep(Duration::from_millis(gap_ms)).await;
            }
            assert_eq!(
                store.export("k").await.unwrap().map(|r| r.value),
                Some(last.clone()).filter(|v| !v.is_missing())
            );

            tokio::time::sleep(Duration::from_millis(101)).await;
        });

        let stats = store.stats();
        prop_assert_eq!(stats.flushes, 1);
        prop_assert_eq!(stats.superseded as usize, values.len() - 1);
        prop_assert_eq!(
            runtime.block_on(backing.export("k")).unwrap().map(|r| r.value),
            Some(last)
        );
    }
}
