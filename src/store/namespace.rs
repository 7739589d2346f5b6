//! Namespace Keying Module
//!
//! Derives physical keys for backends with no native namespace scoping.

use std::fmt;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

const SEPARATOR: char = ':';

/// Whether `namespace` keeps its physical keys apart from every other one.
///
/// A namespace containing `:` shares a prefix with another namespace
/// (`a:b:k` starts with `a:`), so clearing the shorter one would also remove
/// the longer one's keys on prefix-scanning backends.
pub fn is_isolated_namespace(namespace: &str) -> bool {
    !namespace.is_empty() && !namespace.contains(SEPARATOR)
}

// == Namespace Keyer ==
/// Maps logical keys of one namespace to `"<namespace>:<key>"`.
///
/// Namespaces are not escaped. Two namespaces where one plus `:` is a prefix
/// of the other overlap; see [`is_isolated_namespace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceKeyer {
    namespace: String,
    prefix: String,
}

impl NamespaceKeyer {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let prefix = format!("{}{}", namespace, SEPARATOR);
        Self { namespace, prefix }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Physical key prefix shared by every key of this namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // == Attach ==
    pub fn attach(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Detach ==
    /// Logical key of a physical key, if it belongs to this namespace.
    pub fn detach<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical.strip_prefix(self.prefix.as_str())
    }

    pub fn owns(&self, physical: &str) -> bool {
        physical.starts_with(self.prefix.as_str())
    }

    /// Name of the set tracking this namespace's keys on a network cache.
    pub fn membership_set(&self) -> String {
        format!("namespace{}{}", SEPARATOR, self.namespace)
    }
}

impl Default for NamespaceKeyer {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl fmt::Display for NamespaceKeyer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)
    }
}
