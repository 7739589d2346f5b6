//! Store Facade Module
//!
//! Value-level `get`/`set` over the record-level capability. Every backend
//! ends up behind the same async [`Store`], sync ones through `SyncAdapter`.

use std::sync::Arc;
use std::time::Duration;

use crate::backends::{CacheClient, CacheStore, MemoryStore, MemoryTable, SqliteClient, SqliteStore};
use crate::debounce::{DebounceRules, DebounceStats, Debounced};
use crate::error::Result;
use crate::store::{
    Clock, ExpiryPolicy, RawStore, RawStoreSync, Record, SyncAdapter, SystemClock, Value,
    DEFAULT_NAMESPACE,
};

// == Store Options ==
/// Settings shared by every store constructor.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub namespace: String,
    pub debounce: DebounceRules,
    pub clock: Arc<dyn Clock>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            debounce: DebounceRules::new(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_debounce(mut self, debounce: DebounceRules) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn expiry(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(self.clock.clone())
    }
}

// == Store ==
/// Async key-value store over any backend, with debouncing per the options.
#[derive(Clone)]
pub struct Store {
    raw: Debounced,
    expiry: ExpiryPolicy,
    namespace: String,
}

impl Store {
    // == Constructors ==
    /// Wraps an async raw store.
    pub fn new(raw: Arc<dyn RawStore>, options: StoreOptions) -> Self {
        let expiry = options.expiry();
        Self {
            raw: Debounced::new(raw, options.debounce, &options.namespace, expiry.clone()),
            expiry,
            namespace: options.namespace,
        }
    }

    /// Wraps a sync raw store behind the async interface.
    pub fn from_sync<S: RawStoreSync>(raw: S, options: StoreOptions) -> Self {
        Self::new(Arc::new(SyncAdapter::new(raw)), options)
    }

    pub fn memory(table: MemoryTable, options: StoreOptions) -> Self {
        let raw = MemoryStore::new(table, options.namespace.clone(), options.expiry());
        Self::from_sync(raw, options)
    }

    pub fn sqlite(client: SqliteClient, options: StoreOptions) -> Self {
        let raw = SqliteStore::new(client, options.namespace.clone(), options.expiry());
        Self::from_sync(raw, options)
    }

    /// SQLite store on a table other than the default one.
    pub fn sqlite_table(client: SqliteClient, table: &str, options: StoreOptions) -> Self {
        let raw = SqliteStore::new(client, options.namespace.clone(), options.expiry())
            .with_table(table);
        Self::from_sync(raw, options)
    }

    pub fn cache(client: Arc<dyn CacheClient>, options: StoreOptions) -> Self {
        let raw = CacheStore::new(client, options.namespace.clone(), options.expiry());
        Self::new(Arc::new(raw), options)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn stats(&self) -> DebounceStats {
        self.raw.stats()
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.raw.pending_keys()
    }

    // == Get ==
    /// Value under `key`, or `None` when missing or expired.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.raw.export(key).await?.map(|record| record.value))
    }

    // == Set ==
    /// Stores `value`; with a `ttl` it expires that long from now.
    pub async fn set(&self, key: &str, value: impl Into<Value>, ttl: Option<Duration>) -> Result<()> {
        let record = Record::new(value.into(), self.expiry.expires_at(ttl));
        self.raw.import(key, record).await
    }

    pub async fn import(&self, key: &str, record: Record) -> Result<()> {
        self.raw.import(key, record).await
    }

    pub async fn export(&self, key: &str) -> Result<Option<Record>> {
        self.raw.export(key).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.raw.delete(key).await
    }

    /// Removes every key of this store's namespace.
    pub async fn clear(&self) -> Result<()> {
        self.raw.clear().await
    }

    /// Writes pending debounced writes to the backend now.
    pub async fn flush(&self) -> Result<()> {
        self.raw.flush().await
    }
}

// == Sync Store ==
/// Blocking facade over an in-process backend. No debouncing.
#[derive(Debug)]
pub struct SyncStore<S> {
    raw: S,
    expiry: ExpiryPolicy,
}

impl SyncStore<MemoryStore> {
    pub fn memory(table: MemoryTable, options: StoreOptions) -> Self {
        let expiry = options.expiry();
        Self::new(MemoryStore::new(table, options.namespace, expiry.clone()), expiry)
    }
}

impl SyncStore<SqliteStore> {
    pub fn sqlite(client: SqliteClient, options: StoreOptions) -> Self {
        let expiry = options.expiry();
        Self::new(SqliteStore::new(client, options.namespace, expiry.clone()), expiry)
    }
}

impl<S: RawStoreSync> SyncStore<S> {
    pub fn new(raw: S, expiry: ExpiryPolicy) -> Self {
        Self { raw, expiry }
    }

    pub fn raw(&self) -> &S {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.raw.export(key)?.map(|record| record.value))
    }

    pub fn set(&self, key: &str, value: impl Into<Value>, ttl: Option<Duration>) -> Result<()> {
        self.raw
            .import(key, Record::new(value.into(), self.expiry.expires_at(ttl)))
    }

    pub fn import(&self, key: &str, record: Record) -> Result<()> {
        self.raw.import(key, record)
    }

    pub fn export(&self, key: &str) -> Result<Option<Record>> {
        self.raw.export(key)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.raw.delete(key)
    }

    pub fn clear(&self) -> Result<()> {
        self.raw.clear()
    }
}
