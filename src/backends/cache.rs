//! Network Cache Backend
//!
//! Stores records on a Redis-like service. The service has no namespaces, so
//! every written key is also registered in a per-namespace membership set
//! that `clear` enumerates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::backends::CacheClient;
use crate::error::Result;
use crate::store::{codec, ExpiryPolicy, NamespaceKeyer, RawStore, Record};

// == Cache Store ==
/// One namespace on a network cache.
#[derive(Clone)]
pub struct CacheStore {
    client: Arc<dyn CacheClient>,
    keyer: NamespaceKeyer,
    expiry: ExpiryPolicy,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(
        client: Arc<dyn CacheClient>,
        namespace: impl Into<String>,
        expiry: ExpiryPolicy,
    ) -> Self {
        Self {
            client,
            keyer: NamespaceKeyer::new(namespace),
            expiry,
        }
    }

    pub fn namespace(&self) -> &str {
        self.keyer.namespace()
    }
}

#[async_trait]
impl RawStore for CacheStore {
    // == Import ==
    /// Writes the value with native PX expiry and registers the key.
    async fn import(&self, key: &str, record: Record) -> Result<()> {
        let physical = self.keyer.attach(key);
        let membership = self.keyer.membership_set();

        let px = match self.expiry.remaining(record.expires_at) {
            Some(left) if left.is_zero() => {
                // Already expired: PX needs a positive lifetime
                debug!(namespace = %self.keyer, key, "import of expired record, deleting");
                return self.delete(key).await;
            }
            px => px,
        };

        let payload = codec::serialize(&record.value)?;
        tokio::try_join!(
            self.client.set(&physical, payload, px),
            self.client.sadd(&membership, &physical),
        )?;
        Ok(())
    }

    // == Export ==
    /// Reads the value; the expiry instant comes from the live PTTL.
    ///
    /// PTTL is asked before GET. Native expiry only ever removes a key, so a
    /// key that expires between the two commands reads as absent rather than
    /// as a payload with no deadline.
    async fn export(&self, key: &str) -> Result<Option<Record>> {
        let physical = self.keyer.attach(key);

        let now = self.expiry.now_ms();
        let remaining = self.client.pttl(&physical).await?;
        let Some(payload) = self.client.get(&physical).await? else {
            return Ok(None);
        };

        let expires_at = remaining.map(|left| {
            let millis = u64::try_from(left.as_millis()).unwrap_or(u64::MAX);
            now.saturating_add(millis)
        });
        if self.expiry.is_expired(expires_at) {
            debug!(namespace = %self.keyer, key, "evicting expired record");
            self.delete(key).await?;
            return Ok(None);
        }

        Ok(Some(Record::new(codec::deserialize(&payload)?, expires_at)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let physical = self.keyer.attach(key);
        let membership = self.keyer.membership_set();

        tokio::try_join!(
            self.client.del(std::slice::from_ref(&physical)),
            self.client.srem(&membership, &physical),
        )?;
        Ok(())
    }

    // == Clear ==
    /// Deletes every registered key of the namespace and the set itself.
    async fn clear(&self) -> Result<()> {
        let membership = self.keyer.membership_set();
        let mut keys = self.client.smembers(&membership).await?;
        keys.push(membership);
        self.client.del(&keys).await
    }
}
