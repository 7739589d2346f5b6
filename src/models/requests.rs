//! Request DTOs for the store server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::store::{is_isolated_namespace, DEFAULT_NAMESPACE};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `namespace`: Namespace of the key (default namespace if omitted)
/// - `key`: The key to store the value under
/// - `value`: Any JSON value; the string `"__UNDEFINED__"` stores a missing value
/// - `ttl`: Optional TTL in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub namespace: Option<String>,
    pub key: String,
    pub value: serde_json::Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    /// Empty keys are refused since no GET route could address them.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if let Some(namespace) = &self.namespace {
            return namespace_error(namespace);
        }
        None
    }
}

/// Reason `namespace` cannot be addressed, None if it can.
///
/// Namespaces containing `:` would overlap with other namespaces.
pub fn namespace_error(namespace: &str) -> Option<String> {
    if namespace.is_empty() {
        return Some("Namespace cannot be empty".to_string());
    }
    if !is_isolated_namespace(namespace) {
        return Some(format!("Namespace '{}' cannot contain ':'", namespace));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"a": [1, null]}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, serde_json::json!({"a": [1, null]}));
        assert_eq!(req.namespace(), DEFAULT_NAMESPACE);
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_set_request_with_ttl_and_namespace() {
        let json = r#"{"namespace": "users", "key": "test", "value": "hello", "ttl": 60}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(60));
        assert_eq!(req.namespace(), "users");
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            namespace: None,
            key: "".to_string(),
            value: serde_json::Value::Null,
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetRequest {
            namespace: Some("ns".to_string()),
            key: "valid_key".to_string(),
            value: serde_json::Value::Null,
            ttl: Some(60),
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_namespace_with_separator() {
        let req = SetRequest {
            namespace: Some("a:b".to_string()),
            key: "k".to_string(),
            value: serde_json::Value::Null,
            ttl: None,
        };
        assert!(req.validate().unwrap().contains("':'"));
        assert!(namespace_error("a").is_none());
        assert!(namespace_error("").is_some());
    }
}
