//! Raw Store Capability
//!
//! The four record-level operations every backend implements.

use async_trait::async_trait;

use crate::error::Result;
use crate::store::Record;

// == Async Capability ==
/// Record-level storage, possibly suspending on I/O.
///
/// `clear` only touches the store's own namespace. Deleting a key that does
/// not exist succeeds and changes nothing.
#[async_trait]
pub trait RawStore: Send + Sync + 'static {
    async fn import(&self, key: &str, record: Record) -> Result<()>;

    /// Returns `None` for missing or expired keys; expired ones are evicted.
    async fn export(&self, key: &str) -> Result<Option<Record>>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    /// Writes out anything held back. Stores that defer nothing have nothing to do.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

// == Sync Capability ==
/// Record-level storage served in-process without suspending.
pub trait RawStoreSync: Send + Sync + 'static {
    fn import(&self, key: &str, record: Record) -> Result<()>;

    fn export(&self, key: &str) -> Result<Option<Record>>;

    fn delete(&self, key: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

// == Sync Adapter ==
/// Exposes a [`RawStoreSync`] through the async [`RawStore`] interface.
#[derive(Debug, Clone)]
pub struct SyncAdapter<S> {
    inner: S,
}

impl<S: RawStoreSync> SyncAdapter<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RawStoreSync> RawStore for SyncAdapter<S> {
    async fn import(&self, key: &str, record: Record) -> Result<()> {
        self.inner.import(key, record)
    }

    async fn export(&self, key: &str) -> Result<Option<Record>> {
        self.inner.export(key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}
