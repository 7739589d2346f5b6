//! Store Registry
//!
//! Opens one [`Store`] per namespace on a shared backend, on first use.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::backends::{CacheClient, MemoryTable, SqliteClient};
use crate::config::{BackendKind, Config};
use crate::debounce::{DebounceRules, DebounceStats};
use crate::error::Result;
use crate::store::{Clock, Store, StoreOptions, SystemClock};

/// The physical backend every namespace shares.
#[derive(Clone)]
pub enum Backend {
    Memory(MemoryTable),
    Sqlite { client: SqliteClient, table: String },
    Cache(Arc<dyn CacheClient>),
}

impl Backend {
    fn open(&self, options: StoreOptions) -> Store {
        match self {
            Backend::Memory(table) => Store::memory(table.clone(), options),
            Backend::Sqlite { client, table } => Store::sqlite_table(client.clone(), table, options),
            Backend::Cache(client) => Store::cache(client.clone(), options),
        }
    }
}

// == Store Registry ==
pub struct StoreRegistry {
    backend: Backend,
    debounce: DebounceRules,
    clock: Arc<dyn Clock>,
    stores: RwLock<HashMap<String, Store>>,
}

impl StoreRegistry {
    pub fn new(backend: Backend, debounce: DebounceRules) -> Self {
        Self {
            backend,
            debounce,
            clock: Arc::new(SystemClock),
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the backend and debounce rules described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let debounce = config.debounce_rules()?;
        let backend = match config.backend {
            BackendKind::Memory => Backend::Memory(MemoryTable::new()),
            BackendKind::Sqlite => Backend::Sqlite {
                client: SqliteClient::open(&config.sqlite_path)?,
                table: config.table.clone(),
            },
        };
        info!(
            backend = ?config.backend,
            debounce_rules = debounce.len(),
            "store registry ready"
        );
        Ok(Self::new(backend, debounce))
    }

    fn open(&self, namespace: &str) -> Store {
        let options = StoreOptions::new()
            .with_namespace(namespace)
            .with_debounce(self.debounce.clone())
            .with_clock(self.clock.clone());
        self.backend.open(options)
    }

    // == Store ==
    /// The store of `namespace`, opened and kept on first request.
    ///
    /// Use for writes: a kept store is what `flush_all` reaches.
    pub fn store(&self, namespace: &str) -> Store {
        if let Some(store) = self.stores.read().get(namespace) {
            return store.clone();
        }

        self.stores
            .write()
            .entry(namespace.to_string())
            .or_insert_with(|| self.open(namespace))
            .clone()
    }

    // == Lookup ==
    /// The kept store of `namespace`, or a throwaway one when none is open.
    ///
    /// Use for reads and clears. A namespace never written through this
    /// registry has no pending writes, so a fresh store sees the same data.
    pub fn lookup(&self, namespace: &str) -> Store {
        match self.stores.read().get(namespace) {
            Some(store) => store.clone(),
            None => self.open(namespace),
        }
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.stores.read().keys().cloned().collect()
    }

    /// Counters summed over every open store.
    pub fn stats(&self) -> DebounceStats {
        self.stores
            .read()
            .values()
            .fold(DebounceStats::new(), |mut total, store| {
                total.merge(&store.stats());
                total
            })
    }

    // == Flush All ==
    /// Writes every pending debounced write of every namespace.
    ///
    /// All stores are flushed; the first failure is returned.
    pub async fn flush_all(&self) -> Result<()> {
        let stores: Vec<Store> = self.stores.read().values().cloned().collect();
        let mut outcome = Ok(());

        for store in stores {
            if let Err(err) = store.flush().await {
                warn!(namespace = store.namespace(), error = %err, "flush failed");
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }

        outcome
    }
}
