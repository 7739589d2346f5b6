//! API Module
//!
//! HTTP handlers and routing for the store server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a value under a namespaced key
//! - `GET /get/:namespace/:key` - Retrieve a value
//! - `DELETE /del/:namespace/:key` - Delete a key
//! - `DELETE /clear/:namespace` - Clear a namespace
//! - `GET /stats` - Debounce statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
