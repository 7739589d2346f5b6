//! Backends Module
//!
//! Physical storage variants behind the raw store capability:
//! - In-memory table (`MemoryStore`, sync)
//! - Network cache (`CacheStore`, async, over a `CacheClient`)
//! - Embedded SQLite (`SqliteStore`, sync)

mod cache;
mod client;
mod memory;
mod sqlite;

pub use cache::CacheStore;
pub use client::{CacheClient, InProcessCacheClient};
pub use memory::{MemoryStore, MemoryTable};
pub use sqlite::{SqliteClient, SqliteStore, DEFAULT_TABLE};
