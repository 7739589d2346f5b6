//! Embedded Relational Backend
//!
//! SQLite table keyed by `(namespace, key)`, so clearing a namespace is a
//! single filtered delete with no key bookkeeping.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{codec, ExpiryPolicy, Freshness, RawStoreSync, Record, Value};

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "shoebox";

// == SQLite Client ==
/// Clonable handle to one SQLite connection shared by several stores.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteClient {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with<R>(&self, f: impl FnOnce(&Connection) -> R) -> R {
        f(&self.conn.lock())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// == SQLite Store ==
/// One namespace of a SQLite table.
#[derive(Debug)]
pub struct SqliteStore {
    client: SqliteClient,
    namespace: String,
    table: String,
    expiry: ExpiryPolicy,
    /// Set only once the CREATE TABLE statement has succeeded
    initialized: AtomicBool,
}

impl SqliteStore {
    // == Constructor ==
    pub fn new(client: SqliteClient, namespace: impl Into<String>, expiry: ExpiryPolicy) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            table: quote_identifier(DEFAULT_TABLE),
            expiry,
            initialized: AtomicBool::new(false),
        }
    }

    /// Uses `table` instead of the default table name.
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = quote_identifier(table);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    // == Ensure Table ==
    /// Creates the table on first use. A failure leaves the store
    /// uninitialized so the next call tries again.
    fn ensure_table(&self, conn: &Connection) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT,
                expires_at INTEGER,
                PRIMARY KEY (namespace, key)
            )",
            self.table
        ))
        .map_err(|err| StoreError::SchemaInit(err.to_string()))?;

        self.initialized.store(true, Ordering::Release);
        debug!(table = %self.table, "table ready");
        Ok(())
    }

    fn delete_row(&self, conn: &Connection, key: &str) -> Result<()> {
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE namespace = ?1 AND key = ?2",
                self.table
            ),
            params![self.namespace, key],
        )?;
        Ok(())
    }
}

impl RawStoreSync for SqliteStore {
    fn import(&self, key: &str, record: Record) -> Result<()> {
        let payload = codec::serialize(&record.value)?;
        self.client.with(|conn| {
            self.ensure_table(conn)?;
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (namespace, key, value, expires_at) VALUES (?1, ?2, ?3, ?4)",
                    self.table
                ),
                params![
                    self.namespace,
                    key,
                    payload,
                    record.expires_at.map(|at| i64::try_from(at).unwrap_or(i64::MAX))
                ],
            )?;
            Ok(())
        })
    }

    fn export(&self, key: &str) -> Result<Option<Record>> {
        self.client.with(|conn| {
            self.ensure_table(conn)?;

            let row: Option<(Option<String>, Option<i64>)> = conn
                .query_row(
                    &format!(
                        "SELECT value, expires_at FROM {} WHERE namespace = ?1 AND key = ?2 LIMIT 1",
                        self.table
                    ),
                    params![self.namespace, key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let record = match row {
                Some((payload, expires_at)) => {
                    let value = match payload {
                        Some(payload) => codec::deserialize(&payload)?,
                        None => Value::Missing,
                    };
                    Some(Record::new(value, expires_at.map(|at| u64::try_from(at).unwrap_or(0))))
                }
                None => None,
            };

            match self.expiry.check(record) {
                Freshness::Expired => {
                    debug!(namespace = %self.namespace, key, "evicting expired row");
                    self.delete_row(conn, key)?;
                    Ok(None)
                }
                freshness => Ok(freshness.into_record()),
            }
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.client.with(|conn| {
            self.ensure_table(conn)?;
            self.delete_row(conn, key)
        })
    }

    fn clear(&self) -> Result<()> {
        self.client.with(|conn| {
            self.ensure_table(conn)?;
            conn.execute(
                &format!("DELETE FROM {} WHERE namespace = ?1", self.table),
                params![self.namespace],
            )?;
            Ok(())
        })
    }
}
