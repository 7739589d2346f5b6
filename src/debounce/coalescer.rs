//! Debounce Coalescer
//!
//! Wraps a backing store with a private in-memory shadow and per-key timers.
//! Writes to debounced keys land in the shadow at once and reach the backing
//! store only when the key's timer fires; a newer write replaces the pending
//! one, so a burst costs a single backing write carrying the last value.
//!
//! A debounced delete removes the key from the shadow and marks it deleted,
//! so reads stop there instead of falling through to the stale backing copy.
//! The mark lasts until the key is written again or the namespace cleared.
//!
//! Lock order: timer registry, then shadow, then deleted marks.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::backends::{MemoryStore, MemoryTable};
use crate::debounce::{DebounceRules, DebounceStats};
use crate::error::{Result, StoreError};
use crate::store::{ExpiryPolicy, RawStore, RawStoreSync, Record};

/// A write waiting for its timer.
#[derive(Debug, Clone)]
enum Write {
    Import(Record),
    Delete,
}

impl Write {
    async fn apply(self, store: &dyn RawStore, key: &str) -> Result<()> {
        match self {
            Write::Import(record) => store.import(key, record).await,
            Write::Delete => store.delete(key).await,
        }
    }
}

#[derive(Debug)]
struct PendingFlush {
    generation: u64,
    write: Write,
    handle: JoinHandle<()>,
}

struct Inner {
    backing: Arc<dyn RawStore>,
    shadow: MemoryStore,
    deleted: Mutex<HashSet<String>>,
    rules: DebounceRules,
    timers: Mutex<HashMap<String, PendingFlush>>,
    generations: AtomicU64,
    stats: Mutex<DebounceStats>,
}

impl Inner {
    // == Fire ==
    /// Timer expiry: claim the registry entry, then replay its write.
    async fn fire(&self, key: &str, generation: u64) {
        let write = {
            let mut timers = self.timers.lock();
            let current = timers.get(key).map(|pending| pending.generation) == Some(generation);
            if current {
                timers.remove(key).map(|pending| pending.write)
            } else {
                None
            }
        };

        // Replaced or flushed by someone else meanwhile
        let Some(write) = write else {
            return;
        };

        match write.apply(self.backing.as_ref(), key).await {
            Ok(()) => {
                debug!(key, "flushed debounced write");
                self.stats.lock().record_flush();
            }
            Err(err) => {
                error!(key, error = %err, "debounced write lost: backing store rejected flush");
                self.stats.lock().record_flush_failure();
            }
        }
    }
}

// == Debounced ==
/// A [`RawStore`] coalescing writes to keys matched by its rules.
///
/// Keys without a matching rule pass straight through to the backing store.
/// Debounced writes spawn Tokio timers and must run inside a Tokio runtime.
#[derive(Clone)]
pub struct Debounced {
    inner: Arc<Inner>,
}

impl Debounced {
    // == Constructor ==
    pub fn new(
        backing: Arc<dyn RawStore>,
        rules: DebounceRules,
        namespace: &str,
        expiry: ExpiryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backing,
                shadow: MemoryStore::new(MemoryTable::new(), namespace, expiry),
                deleted: Mutex::new(HashSet::new()),
                rules,
                timers: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
                stats: Mutex::new(DebounceStats::new()),
            }),
        }
    }

    pub fn rules(&self) -> &DebounceRules {
        &self.inner.rules
    }

    /// Keys with a write waiting for its timer.
    pub fn pending_keys(&self) -> Vec<String> {
        self.inner.timers.lock().keys().cloned().collect()
    }

    pub fn stats(&self) -> DebounceStats {
        let mut stats = self.inner.stats.lock().clone();
        stats.pending = self.inner.timers.lock().len();
        stats
    }

    // == Schedule ==
    /// Applies `write` to the shadow and (re)starts the key's timer.
    fn schedule(&self, key: &str, write: Write, delay: Duration) -> Result<()> {
        let mut timers = self.inner.timers.lock();

        match &write {
            Write::Import(record) => {
                self.inner.shadow.import(key, record.clone())?;
                self.inner.deleted.lock().remove(key);
            }
            Write::Delete => {
                self.inner.shadow.delete(key)?;
                self.inner.deleted.lock().insert(key.to_string());
            }
        }

        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fire(&task_key, generation).await;
        });

        let replaced = timers.insert(
            key.to_string(),
            PendingFlush {
                generation,
                write,
                handle,
            },
        );
        if let Some(previous) = replaced {
            previous.handle.abort();
            self.inner.stats.lock().record_superseded();
        }

        debug!(key, delay_ms = delay.as_millis() as u64, "scheduled debounced write");
        Ok(())
    }

    /// Cancels every timer and hands back their writes.
    fn take_pending(&self) -> Vec<(String, Write)> {
        self.inner
            .timers
            .lock()
            .drain()
            .map(|(key, pending)| {
                pending.handle.abort();
                (key, pending.write)
            })
            .collect()
    }
}

#[async_trait]
impl RawStore for Debounced {
    async fn import(&self, key: &str, record: Record) -> Result<()> {
        match self.inner.rules.delay_for(key) {
            Some(delay) => self.schedule(key, Write::Import(record), delay),
            None => self.inner.backing.import(key, record).await,
        }
    }

    // == Export ==
    /// Debounced keys read the shadow first and fill it from the backing
    /// store on a miss. Reads never touch timers.
    async fn export(&self, key: &str) -> Result<Option<Record>> {
        if self.inner.rules.delay_for(key).is_none() {
            return self.inner.backing.export(key).await;
        }

        {
            let timers = self.inner.timers.lock();
            if let Some(record) = self.inner.shadow.export(key)? {
                self.inner.stats.lock().record_shadow_hit();
                return Ok(Some(record));
            }

            // Deleted here, or the pending write expired in the shadow:
            // backing only holds older data
            if timers.contains_key(key) || self.inner.deleted.lock().contains(key) {
                return Ok(None);
            }
        }

        self.inner.stats.lock().record_read_through();
        let record = self.inner.backing.export(key).await?;

        if let Some(record) = &record {
            let timers = self.inner.timers.lock();
            // A write that raced this read is newer than what we fetched
            if !timers.contains_key(key)
                && !self.inner.deleted.lock().contains(key)
                && self.inner.shadow.export(key)?.is_none()
            {
                self.inner.shadow.import(key, record.clone())?;
            }
        }

        Ok(record)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.inner.rules.delay_for(key) {
            Some(delay) => self.schedule(key, Write::Delete, delay),
            None => self.inner.backing.delete(key).await,
        }
    }

    // == Clear ==
    /// Never debounced. Pending writes predate the clear and are dropped.
    async fn clear(&self) -> Result<()> {
        let dropped = self.take_pending().len();
        if dropped > 0 {
            debug!(dropped, "clear cancelled pending debounced writes");
        }
        self.inner.shadow.clear()?;
        self.inner.deleted.lock().clear();
        self.inner.backing.clear().await
    }

    // == Flush ==
    /// Writes every pending debounced write to the backing store now.
    ///
    /// All writes are attempted; the first failure is returned.
    async fn flush(&self) -> Result<()> {
        let mut first_error: Option<StoreError> = None;

        for (key, write) in self.take_pending() {
            match write.apply(self.inner.backing.as_ref(), &key).await {
                Ok(()) => self.inner.stats.lock().record_flush(),
                Err(err) => {
                    error!(key = %key, error = %err, "flush of debounced write failed");
                    self.inner.stats.lock().record_flush_failure();
                    first_error.get_or_insert(err);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
