//! Response DTOs for the store server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::debounce::DebounceStats;
use crate::store::Record;

/// Response body for the GET operation (GET /get/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub namespace: String,
    pub key: String,
    /// The stored value, missing values as `"__UNDEFINED__"`
    pub value: serde_json::Value,
    /// Expiration timestamp (Unix milliseconds), null = no expiration
    pub expires_at: Option<u64>,
}

impl GetResponse {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, record: &Record) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value: record.value.to_json(),
            expires_at: record.expires_at,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    pub namespace: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        let (namespace, key) = (namespace.into(), key.into());
        Self {
            message: format!("Key '{}' set successfully in '{}'", key, namespace),
            namespace,
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    pub namespace: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        let (namespace, key) = (namespace.into(), key.into());
        Self {
            message: format!("Key '{}' deleted successfully from '{}'", key, namespace),
            namespace,
            key,
        }
    }
}

/// Response body for the CLEAR operation (DELETE /clear/:namespace)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub namespace: String,
}

impl ClearResponse {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            message: format!("Namespace '{}' cleared", namespace),
            namespace,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Namespaces with an open store
    pub namespaces: usize,
    #[serde(flatten)]
    pub debounce: DebounceStats,
    /// shadow_hits / (shadow_hits + read_throughs)
    pub shadow_hit_rate: f64,
}

impl StatsResponse {
    pub fn new(namespaces: usize, debounce: DebounceStats) -> Self {
        Self {
            namespaces,
            shadow_hit_rate: debounce.shadow_hit_rate(),
            debounce,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;

    #[test]
    fn test_get_response_serialize() {
        let record = Record::new(
            Value::Array(vec![Value::Missing, Value::from("v")]),
            Some(42),
        );
        let resp = GetResponse::new("ns", "test_key", &record);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "test_key");
        assert_eq!(json["value"], serde_json::json!(["__UNDEFINED__", "v"]));
        assert_eq!(json["expires_at"], 42);
    }

    #[test]
    fn test_set_and_delete_response_serialize() {
        let json = serde_json::to_string(&SetResponse::new("ns", "my_key")).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));

        let json = serde_json::to_string(&DeleteResponse::new("ns", "deleted_key")).unwrap();
        assert!(json.contains("deleted_key"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let mut stats = DebounceStats::new();
        stats.record_shadow_hit();
        stats.record_read_through();
        stats.record_flush();

        let json = serde_json::to_value(StatsResponse::new(2, stats)).unwrap();
        assert_eq!(json["namespaces"], 2);
        assert_eq!(json["flushes"], 1);
        assert_eq!(json["shadow_hit_rate"], 0.5);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
