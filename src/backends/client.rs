//! Network Cache Client
//!
//! The command set the network-cache backend needs from a Redis-like
//! service, plus an in-process implementation of it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::store::{Clock, SystemClock};

// == Cache Client ==
/// Commands of a network key-value cache with native expiry and sets.
///
/// Implementations wrap a wire client; errors map to `StoreError::Backend`.
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    /// `GET key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// `SET key value [PX millis]`
    async fn set(&self, key: &str, value: String, px: Option<Duration>) -> Result<()>;

    /// `PTTL key`, `None` when the key is missing or has no expiry
    async fn pttl(&self, key: &str) -> Result<Option<Duration>>;

    /// `DEL key [key ...]`
    async fn del(&self, keys: &[String]) -> Result<()>;

    /// `SADD set member`
    async fn sadd(&self, set: &str, member: &str) -> Result<()>;

    /// `SREM set member`
    async fn srem(&self, set: &str, member: &str) -> Result<()>;

    /// `SMEMBERS set`
    async fn smembers(&self, set: &str) -> Result<Vec<String>>;
}

#[derive(Debug)]
struct Entry {
    payload: String,
    deadline: Option<u64>,
}

#[derive(Debug, Default)]
struct Keyspace {
    strings: HashMap<String, Entry>,
    sets: HashMap<String, HashSet<String>>,
}

impl Keyspace {
    /// Native expiry: a string past its deadline is gone.
    fn purge_if_expired(&mut self, key: &str, now: u64) {
        let expired = matches!(
            self.strings.get(key),
            Some(Entry { deadline: Some(deadline), .. }) if *deadline <= now
        );
        if expired {
            self.strings.remove(key);
        }
    }
}

// == In-Process Client ==
/// A [`CacheClient`] served from process memory, with expiry driven by a clock.
#[derive(Debug, Clone)]
pub struct InProcessCacheClient {
    keyspace: Arc<Mutex<Keyspace>>,
    clock: Arc<dyn Clock>,
}

impl InProcessCacheClient {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(Keyspace::default())),
            clock,
        }
    }

    /// Whether a plain key exists, ignoring native expiry.
    pub fn contains_raw(&self, key: &str) -> bool {
        self.keyspace.lock().strings.contains_key(key)
    }

    /// Whether a set exists.
    pub fn has_set(&self, set: &str) -> bool {
        self.keyspace.lock().sets.contains_key(set)
    }
}

impl Default for InProcessCacheClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheClient for InProcessCacheClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now_ms();
        let mut keyspace = self.keyspace.lock();
        keyspace.purge_if_expired(key, now);
        Ok(keyspace.strings.get(key).map(|entry| entry.payload.clone()))
    }

    async fn set(&self, key: &str, value: String, px: Option<Duration>) -> Result<()> {
        let deadline = px.map(|px| {
            let millis = u64::try_from(px.as_millis()).unwrap_or(u64::MAX);
            self.clock.now_ms().saturating_add(millis)
        });
        self.keyspace.lock().strings.insert(
            key.to_string(),
            Entry {
                payload: value,
                deadline,
            },
        );
        Ok(())
    }

    async fn pttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = self.clock.now_ms();
        let mut keyspace = self.keyspace.lock();
        keyspace.purge_if_expired(key, now);
        Ok(keyspace
            .strings
            .get(key)
            .and_then(|entry| entry.deadline)
            .map(|deadline| Duration::from_millis(deadline.saturating_sub(now))))
    }

    async fn del(&self, keys: &[String]) -> Result<()> {
        let mut keyspace = self.keyspace.lock();
        for key in keys {
            keyspace.strings.remove(key);
            keyspace.sets.remove(key);
        }
        Ok(())
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<()> {
        self.keyspace
            .lock()
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, set: &str, member: &str) -> Result<()> {
        let mut keyspace = self.keyspace.lock();
        if let Some(members) = keyspace.sets.get_mut(set) {
            members.remove(member);
            if members.is_empty() {
                keyspace.sets.remove(set);
            }
        }
        Ok(())
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        Ok(self
            .keyspace
            .lock()
            .sets
            .get(set)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}
