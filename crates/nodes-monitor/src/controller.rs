use std::time::Duration;

use settle_engine::{Action, FromStore, ReconcileError, Reconciler, Request, StoreHandle};
use settle_store::{LabelSelector, ListOptions, ObjectStoreExt, Requirement, StoreError, ignore_not_found};
use settle_types::core::Node;
use tracing::{debug, info};

use crate::resource::NodesMonitor;

/// Delay before the node count is checked again.
pub const RESYNC_PERIOD: Duration = Duration::from_secs(60);

/// Keeps `NodesMonitor` status in line with the nodes present in the store.
pub struct NodesMonitorController {
    store: StoreHandle,
}

impl FromStore for NodesMonitorController {
    fn from_store(store: StoreHandle) -> Self {
        Self { store }
    }
}

impl Reconciler for NodesMonitorController {
    fn reconcile(&self, request: &Request) -> Result<Action, ReconcileError> {
        let Some(mut monitor) = ignore_not_found(self.store.get::<NodesMonitor>(&request.key))? else {
            debug!(key = %request.key, "nodes monitor not found");
            return Ok(Action::await_change());
        };

        if monitor.spec.active != monitor.status.active {
            monitor.status.active = monitor.spec.active;
            self.store.update_status(&mut monitor)?;
            info!(key = %request.key, active = monitor.status.active, "monitoring toggled");
            return Ok(Action::requeue());
        }

        if monitor.status.active {
            let nodes = self.list_filtered_nodes(&monitor)?;
            if nodes.len() != monitor.status.num_nodes {
                let threshold_exceeded = i64::try_from(nodes.len()).unwrap_or(i64::MAX) >= monitor.spec.alert_threshold;
                monitor.status.num_nodes = nodes.len();
                monitor.status.add_threshold_exceeded_condition(threshold_exceeded);
                self.store.update_status(&mut monitor)?;
                info!(key = %request.key, num_nodes = nodes.len(), threshold_exceeded, "node count updated");
            }
        }

        Ok(Action::requeue_after(RESYNC_PERIOD))
    }
}

impl NodesMonitorController {
    fn list_filtered_nodes(&self, monitor: &NodesMonitor) -> Result<Vec<Node>, StoreError> {
        let mut options = ListOptions::default();
        if !monitor.spec.node_label_filter.is_empty() {
            let requirement = Requirement::exists(monitor.spec.node_label_filter.as_str())?;
            options = options.with_selector(LabelSelector::new().add(requirement));
        }
        self.store.list::<Node>(&options)
    }
}
