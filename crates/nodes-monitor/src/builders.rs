//! Fixture builders for scenarios exercising [`NodesMonitorController`](crate::NodesMonitorController).

use settle_engine::ObjectsBuilder;
use settle_types::{Object, Resource, core::Node};

use crate::resource::NodesMonitor;

/// Namespace used by [`NodesMonitorBuilder`] unless overridden.
pub const DEFAULT_NAMESPACE: &str = "nodes-monitor";

pub const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";
pub const WORKER_LABEL: &str = "node-role.kubernetes.io/worker";

/// Batches of labelled nodes named `control-plane-<i>` and `worker-<i>`.
#[derive(Debug, Clone, Default)]
pub struct SetupHelper {
    nodes: Vec<Node>,
}

impl SetupHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control_planes(mut self, count: usize) -> Self {
        for index in 0..count {
            self.nodes.push(NodeBuilder::new(format!("control-plane-{index}")).label(CONTROL_PLANE_LABEL).into_node());
        }
        self
    }

    pub fn workers(mut self, count: usize) -> Self {
        for index in 0..count {
            self.nodes.push(NodeBuilder::new(format!("worker-{index}")).label(WORKER_LABEL).into_node());
        }
        self
    }
}

impl ObjectsBuilder for SetupHelper {
    fn build(&self) -> Vec<Box<dyn Object>> {
        self.nodes.iter().cloned().map(Resource::boxed).collect()
    }
}

#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { node: Node::new(name) }
    }

    /// Adds a label with an empty value.
    pub fn label(self, key: impl Into<String>) -> Self {
        self.label_value(key, "")
    }

    pub fn label_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node.metadata.labels.insert(key.into(), value.into());
        self
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn object(self) -> Box<dyn Object> {
        self.node.boxed()
    }
}

impl ObjectsBuilder for NodeBuilder {
    fn build(&self) -> Vec<Box<dyn Object>> {
        vec![self.node.clone().boxed()]
    }
}

/// Inactive monitor with no filter and a threshold of -1, so any count exceeds it.
#[derive(Debug, Clone)]
pub struct NodesMonitorBuilder {
    monitor: NodesMonitor,
}

impl NodesMonitorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut monitor = NodesMonitor::default();
        monitor.metadata.name = name.into();
        monitor.metadata.namespace = DEFAULT_NAMESPACE.to_string();
        monitor.spec.alert_threshold = -1;
        Self { monitor }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.monitor.metadata.namespace = namespace.into();
        self
    }

    pub fn active(mut self) -> Self {
        self.monitor.spec.active = true;
        self
    }

    /// Counts only nodes carrying `label`.
    pub fn filter(mut self, label: impl Into<String>) -> Self {
        self.monitor.spec.node_label_filter = label.into();
        self
    }

    pub fn alert_threshold(mut self, threshold: i64) -> Self {
        self.monitor.spec.alert_threshold = threshold;
        self
    }

    pub fn into_monitor(self) -> NodesMonitor {
        self.monitor
    }

    pub fn object(self) -> Box<dyn Object> {
        self.monitor.boxed()
    }
}

impl ObjectsBuilder for NodesMonitorBuilder {
    fn build(&self) -> Vec<Box<dyn Object>> {
        vec![self.monitor.clone().boxed()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_helper_names_and_labels_nodes() {
        let objects = SetupHelper::new().control_planes(2).workers(1).build();
        let names: Vec<&str> = objects.iter().map(|object| object.meta().name.as_str()).collect();
        assert_eq!(names, vec!["control-plane-0", "control-plane-1", "worker-0"]);
        assert_eq!(objects[0].meta().labels.get(CONTROL_PLANE_LABEL).map(String::as_str), Some(""));
        assert!(objects[2].meta().labels.contains_key(WORKER_LABEL));
    }

    #[test]
    fn monitor_builder_defaults() {
        let monitor = NodesMonitorBuilder::new("nodes-counter").into_monitor();
        assert_eq!(monitor.metadata.namespace, DEFAULT_NAMESPACE);
        assert_eq!(monitor.spec.alert_threshold, -1);
        assert!(!monitor.spec.active);
        assert!(monitor.spec.node_label_filter.is_empty());
    }

    #[test]
    fn monitor_builder_namespace_override() {
        let monitor = NodesMonitorBuilder::new("nodes-counter").in_namespace("ops").into_monitor();
        assert_eq!(monitor.key().to_string(), "ops/nodes-counter");
    }
}
