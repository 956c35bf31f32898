//! Metadata and condition types shared by every record kind.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::NamespacedKey;

/// Ordered label map attached to a record.
pub type Labels = IndexMap<String, String>;

/// Identity and bookkeeping fields common to every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: Labels,
    /// Opaque version assigned by the store on every write.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    /// Bumped by the store whenever the primary (non-status) fields change.
    #[serde(default)]
    pub generation: u64,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> NamespacedKey {
        NamespacedKey::new(self.name.clone(), self.namespace.clone())
    }

    /// Adds (or replaces) a label, returning the updated metadata.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Tri-state status of a [`Condition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// Observation recorded in a record's status, e.g. a threshold being crossed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub r#type: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Builds a condition stamped with the current time.
    pub fn new(r#type: impl Into<String>, status: ConditionStatus, message: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            status,
            reason: String::new(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_serializes_camel_case_and_skips_empty_fields() {
        let meta = ObjectMeta::named("node-0").with_label("role", "worker");
        let value = serde_json::to_value(&meta).expect("serialize meta");
        assert_eq!(value, json!({ "name": "node-0", "labels": { "role": "worker" }, "generation": 0 }));
    }

    #[test]
    fn metadata_key_carries_namespace() {
        let meta = ObjectMeta::namespaced("cm0", "cm");
        assert_eq!(meta.key(), NamespacedKey::new("cm0", "cm"));
    }
}
