//! API Handlers
//!
//! HTTP request handlers for each store server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::models::{
    namespace_error, ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest,
    SetResponse, StatsResponse,
};
use crate::registry::StoreRegistry;
use crate::store::Value;

/// Application state shared across all handlers.
///
/// The registry hands out one store per namespace; stores are cheap to clone
/// and safe to use concurrently, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StoreRegistry>,
}

impl AppState {
    pub fn new(registry: StoreRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails when the backend cannot be opened or the debounce rules are invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(StoreRegistry::from_config(config)?))
    }
}

fn check_namespace(namespace: &str) -> Result<()> {
    match namespace_error(namespace) {
        Some(error_msg) => Err(StoreError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /set
///
/// Stores a value under a namespaced key with an optional TTL in milliseconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(StoreError::InvalidRequest(error_msg));
    }

    let namespace = req.namespace().to_string();
    let ttl = req.ttl.map(Duration::from_millis);
    debug!(namespace = %namespace, key = %req.key, ?ttl, "set");

    let store = state.registry.store(&namespace);
    store.set(&req.key, Value::from(req.value), ttl).await?;

    Ok(Json(SetResponse::new(namespace, req.key)))
}

/// Handler for GET /get/:namespace/:key
///
/// Absent and expired keys are both a 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    check_namespace(&namespace)?;
    let record = state
        .registry
        .lookup(&namespace)
        .export(&key)
        .await?
        .ok_or_else(|| StoreError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(namespace, key, &record)))
}

/// Handler for DELETE /del/:namespace/:key
///
/// Deleting an absent key succeeds. Deletes may be debounced, so like sets
/// they keep the namespace's store open.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    check_namespace(&namespace)?;
    state.registry.store(&namespace).delete(&key).await?;

    Ok(Json(DeleteResponse::new(namespace, key)))
}

/// Handler for DELETE /clear/:namespace
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ClearResponse>> {
    check_namespace(&namespace)?;
    state.registry.lookup(&namespace).clear().await?;

    Ok(Json(ClearResponse::new(namespace)))
}

/// Handler for GET /stats
///
/// Debounce counters summed over every namespace in use.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let namespaces = state.registry.namespaces().len();
    Json(StatsResponse::new(namespaces, state.registry.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryTable;
    use crate::debounce::DebounceRules;
    use crate::registry::Backend;

    fn test_state() -> AppState {
        AppState::new(StoreRegistry::new(
            Backend::Memory(MemoryTable::new()),
            DebounceRules::new(),
        ))
    }

    fn set_request(namespace: Option<&str>, key: &str, value: serde_json::Value) -> SetRequest {
        SetRequest {
            namespace: namespace.map(str::to_string),
            key: key.to_string(),
            value,
            ttl: None,
        }
    }

    fn path(namespace: &str, key: &str) -> Path<(String, String)> {
        Path((namespace.to_string(), key.to_string()))
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = set_request(Some("users"), "test_key", serde_json::json!({"n": 1}));
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state.clone()), path("users", "test_key"))
            .await
            .unwrap();
        assert_eq!(response.value, serde_json::json!({"n": 1}));
        assert_eq!(response.expires_at, None);
    }

    #[tokio::test]
    async fn test_set_uses_default_namespace() {
        let state = test_state();

        let req = set_request(None, "k", serde_json::json!("v"));
        let response = set_handler(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(response.namespace, "default");

        assert!(get_handler(State(state), path("default", "k")).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_with_ttl_reports_expiry() {
        let state = test_state();

        let mut req = set_request(Some("ns"), "k", serde_json::json!(1));
        req.ttl = Some(60_000);
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let response = get_handler(State(state), path("ns", "k")).await.unwrap();
        assert!(response.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state.clone()), path("ns", "nonexistent")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(state.registry.namespaces().is_empty());
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let req = set_request(Some("ns"), "to_delete", serde_json::json!("value"));
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let result = delete_handler(State(state.clone()), path("ns", "to_delete")).await;
        assert!(result.is_ok());

        let result = get_handler(State(state.clone()), path("ns", "to_delete")).await;
        assert!(result.is_err());

        // Absent keys delete fine
        assert!(delete_handler(State(state), path("ns", "to_delete")).await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_handler_keeps_other_namespaces() {
        let state = test_state();

        for ns in ["a", "b"] {
            let req = set_request(Some(ns), "k", serde_json::json!(ns));
            set_handler(State(state.clone()), Json(req)).await.unwrap();
        }

        clear_handler(State(state.clone()), Path("a".to_string()))
            .await
            .unwrap();

        assert!(get_handler(State(state.clone()), path("a", "k")).await.is_err());
        assert!(get_handler(State(state), path("b", "k")).await.is_ok());
    }

    #[tokio::test]
    async fn test_namespace_with_separator_is_rejected() {
        let state = test_state();

        let req = set_request(Some("a:b"), "k", serde_json::json!(1));
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(matches!(result, Err(StoreError::InvalidRequest(_))));

        let result = get_handler(State(state.clone()), path("a:b", "k")).await;
        assert!(matches!(result, Err(StoreError::InvalidRequest(_))));
        let result = delete_handler(State(state.clone()), path("a:b", "k")).await;
        assert!(matches!(result, Err(StoreError::InvalidRequest(_))));
        let result = clear_handler(State(state.clone()), Path("a:b".to_string())).await;
        assert!(matches!(result, Err(StoreError::InvalidRequest(_))));

        assert!(state.registry.namespaces().is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.namespaces, 0);
        assert_eq!(response.debounce.flushes, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = set_request(None, "", serde_json::json!("value"));
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(matches!(result, Err(StoreError::InvalidRequest(_))));

        let req = set_request(Some(""), "k", serde_json::json!("value"));
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(StoreError::InvalidRequest(_))));
    }
}
