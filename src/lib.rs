//! Shoebox - A namespaced key-value store with TTL and write debouncing
//!
//! One async store facade over interchangeable backends (in-memory, network
//! cache, SQLite), with optional per-key write coalescing.

pub mod api;
pub mod backends;
pub mod config;
pub mod debounce;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, StoreError};
pub use registry::{Backend, StoreRegistry};
pub use store::{Store, StoreOptions, Value};
