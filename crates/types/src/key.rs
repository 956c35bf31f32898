use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a record by name and (optional) namespace.
///
/// The default key is empty; reconcilers receive it when a scenario waits on a
/// condition before any target was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespacedKey {
    /// Record name.
    pub name: String,
    /// Record namespace; empty for cluster-scoped records.
    #[serde(default)]
    pub namespace: String,
}

impl NamespacedKey {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Key for a record that lives outside any namespace.
    pub fn cluster_scoped(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.namespace.is_empty()
    }
}

impl From<&str> for NamespacedKey {
    fn from(name: &str) -> Self {
        Self::cluster_scoped(name)
    }
}

impl From<String> for NamespacedKey {
    fn from(name: String) -> Self {
        Self::cluster_scoped(name)
    }
}

/// `(name, namespace)` pair.
impl From<(&str, &str)> for NamespacedKey {
    fn from((name, namespace): (&str, &str)) -> Self {
        Self::new(name, namespace)
    }
}

impl fmt::Display for NamespacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_empty_namespace() {
        assert_eq!(NamespacedKey::cluster_scoped("node-0").to_string(), "node-0");
        assert_eq!(NamespacedKey::new("cm0", "cm").to_string(), "cm/cm0");
    }

    #[test]
    fn default_key_is_empty() {
        assert!(NamespacedKey::default().is_empty());
        assert!(!NamespacedKey::cluster_scoped("a").is_empty());
    }
}
