//! `NodesMonitor` record kind.

use serde::{Deserialize, Serialize};
use settle_store::{Scheme, SchemeError};
use settle_types::{Condition, ConditionStatus, ObjectMeta, Resource};

/// Condition type appended whenever the node count crosses the alert threshold.
pub const THRESHOLD_EXCEEDED: &str = "ThresholdExceeded";

/// Counts the nodes of a cluster and raises a condition past a threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodesMonitor {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodesMonitorSpec,
    #[serde(default)]
    pub status: NodesMonitorStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesMonitorSpec {
    /// Whether counting is enabled.
    #[serde(default)]
    pub active: bool,

    /// Node count at or above which the threshold condition turns true.
    #[serde(default)]
    pub alert_threshold: i64,

    /// Only nodes carrying this label (any value) are counted.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_label_filter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesMonitorStatus {
    #[serde(default)]
    pub num_nodes: usize,

    #[serde(default)]
    pub active: bool,

    /// History of threshold transitions, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl NodesMonitorStatus {
    /// Appends a threshold condition unless the latest one already reports the same status.
    pub fn add_threshold_exceeded_condition(&mut self, threshold_exceeded: bool) {
        let condition = if threshold_exceeded {
            Condition::new(THRESHOLD_EXCEEDED, ConditionStatus::True, "Nodes count is above the threshold.")
        } else {
            Condition::new(THRESHOLD_EXCEEDED, ConditionStatus::False, "Nodes count is below the threshold.")
        };

        if self.latest_condition().is_none_or(|latest| latest.status != condition.status) {
            self.conditions.push(condition);
        }
    }

    pub fn latest_condition(&self) -> Option<&Condition> {
        self.conditions.last()
    }
}

impl Resource for NodesMonitor {
    const KIND: &'static str = "NodesMonitor";
    const HAS_STATUS: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Registers [`NodesMonitor`] with a scheme.
pub fn add_to_scheme(scheme: &mut Scheme) -> Result<(), SchemeError> {
    scheme.register::<NodesMonitor>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_are_only_added_on_transitions() {
        let mut status = NodesMonitorStatus::default();
        assert!(status.latest_condition().is_none());

        status.add_threshold_exceeded_condition(false);
        status.add_threshold_exceeded_condition(false);
        assert_eq!(status.conditions.len(), 1);

        status.add_threshold_exceeded_condition(true);
        let latest = status.latest_condition().expect("condition recorded");
        assert_eq!(status.conditions.len(), 2);
        assert_eq!(latest.r#type, THRESHOLD_EXCEEDED);
        assert!(latest.is_true());
        assert_eq!(latest.message, "Nodes count is above the threshold.");
    }

    #[test]
    fn add_to_scheme_registers_status_kind() {
        let mut scheme = Scheme::new();
        add_to_scheme(&mut scheme).expect("register NodesMonitor");
        let info = scheme.kind(NodesMonitor::KIND).expect("kind registered");
        assert!(info.has_status);
    }
}
