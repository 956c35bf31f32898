use std::sync::Arc;

use settle_engine::{FromStore, ObjectsBuilder, Reconciler, Request, Scenario};
use settle_nodes_monitor::{
    NodesMonitor, NodesMonitorController, RESYNC_PERIOD, add_to_scheme,
    builders::{CONTROL_PLANE_LABEL, DEFAULT_NAMESPACE, NodeBuilder, NodesMonitorBuilder, SetupHelper, WORKER_LABEL},
};
use settle_store::{InMemoryStore, ObjectStoreExt, Scheme, add_core_to_scheme};
use settle_types::{ConditionStatus, NamespacedKey, Resource};

type NodesMonitorScenario = Scenario<NodesMonitorController, NodesMonitor>;

fn scenario() -> NodesMonitorScenario {
    settle_engine::init_tracing();
    NodesMonitorScenario::new().with_schemes(&[add_to_scheme, add_core_to_scheme])
}

fn latest_status(monitor: &NodesMonitor) -> Option<ConditionStatus> {
    monitor.status.latest_condition().map(|condition| condition.status)
}

#[test]
fn one_node() {
    scenario()
        .setup(vec![
            NodeBuilder::new("node-0").boxed(),
            NodesMonitorBuilder::new("nodes-counter").active().boxed(),
        ])
        .next_target(("nodes-counter", DEFAULT_NAMESPACE))
        .wait_until(|_, monitor| monitor.status.num_nodes == 1, &["check that exactly one node was found"])
        .test();
}

#[test]
fn inactive_monitor_starts_counting_once_enabled() {
    scenario()
        .setup(vec![
            NodeBuilder::new("node-0").boxed(),
            NodesMonitorBuilder::new("nodes-counter").boxed(),
        ])
        .next_target(("nodes-counter", DEFAULT_NAMESPACE))
        .wait_until(
            |_, monitor| monitor.status.num_nodes == 0 && !monitor.status.active,
            &["check initial resource creation"],
        )
        .then(
            |store, monitor| {
                monitor.spec.active = true;
                store.update(monitor)?;
                Ok(())
            },
            &["enable the nodes monitoring"],
        )
        .wait_until(|_, monitor| monitor.status.num_nodes == 1 && monitor.status.active, &[])
        .test();
}

#[test]
fn filter_counts_a_subset_of_nodes() {
    scenario()
        .setup(vec![
            SetupHelper::new().control_planes(3).workers(2).boxed(),
            NodesMonitorBuilder::new("control-plane-counter").active().filter(CONTROL_PLANE_LABEL).boxed(),
            NodesMonitorBuilder::new("worker-counter").active().filter(WORKER_LABEL).boxed(),
        ])
        .next_target(("control-plane-counter", DEFAULT_NAMESPACE))
        .wait_until(
            |_, monitor| monitor.name() == "control-plane-counter" && monitor.status.num_nodes == 3,
            &["check the number of control planes"],
        )
        .next_target(("worker-counter", DEFAULT_NAMESPACE))
        .wait_until(
            |_, monitor| monitor.name() == "worker-counter" && monitor.status.num_nodes == 2,
            &["then verify the number of workers"],
        )
        .test();
}

#[test]
fn going_over_the_threshold() {
    scenario()
        .setup(vec![
            SetupHelper::new().control_planes(3).workers(1).boxed(),
            NodesMonitorBuilder::new("control-plane-counter")
                .active()
                .filter(CONTROL_PLANE_LABEL)
                .alert_threshold(4)
                .boxed(),
        ])
        .next_target(("control-plane-counter", DEFAULT_NAMESPACE))
        .wait_until(
            |_, monitor| {
                monitor.status.num_nodes == 3
                    && monitor.status.conditions.first().is_some_and(|condition| condition.status == ConditionStatus::False)
            },
            &["initially the number of control plane nodes is below the threshold"],
        )
        .then(
            |store, _| {
                let mut node = NodeBuilder::new("control-plane-4").label(CONTROL_PLANE_LABEL).into_node();
                store.create(&mut node)?;
                Ok(())
            },
            &["add a new node to reach the threshold"],
        )
        .wait_until(
            |_, monitor| {
                monitor.status.num_nodes == 4
                    && monitor.status.conditions.get(1).is_some_and(|condition| condition.status == ConditionStatus::True)
            },
            &["verify that the threshold alert has been triggered"],
        )
        .test();
}

#[test]
fn falling_back_below_the_threshold() {
    scenario()
        .setup(vec![
            SetupHelper::new().control_planes(3).workers(1).boxed(),
            NodesMonitorBuilder::new("control-plane-counter")
                .active()
                .filter(CONTROL_PLANE_LABEL)
                .alert_threshold(3)
                .boxed(),
        ])
        .next_target(("control-plane-counter", DEFAULT_NAMESPACE))
        .wait_until(
            |_, monitor| monitor.status.num_nodes == 3 && latest_status(monitor) == Some(ConditionStatus::True),
            &["wait for the initial status"],
        )
        .then(
            |store, _| {
                store.delete(&NodeBuilder::new("control-plane-0").into_node())?;
                Ok(())
            },
            &["remove one node to decrease the counter below the threshold"],
        )
        .wait_until(
            |_, monitor| monitor.status.num_nodes == 2 && latest_status(monitor) == Some(ConditionStatus::False),
            &["verify the new updated status"],
        )
        .test();
}

#[test]
fn avoid_redundant_condition_updates() {
    scenario()
        .setup(vec![
            SetupHelper::new().control_planes(3).boxed(),
            NodesMonitorBuilder::new("control-plane-counter")
                .active()
                .filter(CONTROL_PLANE_LABEL)
                .alert_threshold(2)
                .boxed(),
        ])
        .next_target(("control-plane-counter", DEFAULT_NAMESPACE))
        .wait_until(
            |_, monitor| {
                monitor.status.num_nodes == 3
                    && latest_status(monitor) == Some(ConditionStatus::True)
                    && monitor.status.conditions.len() == 1
            },
            &["wait for the initial status"],
        )
        .then(
            |store, _| {
                let mut node = NodeBuilder::new("control-plane-4").label(CONTROL_PLANE_LABEL).into_node();
                store.create(&mut node)?;
                Ok(())
            },
            &["add another control-plane node, still above the threshold"],
        )
        .wait_until(
            |_, monitor| {
                monitor.status.num_nodes == 4
                    && latest_status(monitor) == Some(ConditionStatus::True)
                    && monitor.status.conditions.len() == 1
            },
            &["verify the counter was updated, but not the conditions"],
        )
        .test();
}

#[test]
fn monitor_created_by_a_step_is_reconciled() {
    scenario()
        .setup(vec![
            SetupHelper::new().workers(2).boxed(),
            NodesMonitorBuilder::new("seeded-counter").boxed(),
        ])
        .next_target_object(|| NodesMonitorBuilder::new("late-counter").active().object())
        .wait_until(|_, monitor| monitor.status.active && monitor.status.num_nodes == 2, &["late monitor counts workers"])
        .test();
}

#[test]
fn malformed_filter_fails_the_run() {
    let error = scenario()
        .setup(vec![NodesMonitorBuilder::new("nodes-counter").active().filter("bad key").boxed()])
        .next_target(("nodes-counter", DEFAULT_NAMESPACE))
        .wait_until(|_, monitor| monitor.status.num_nodes == 1, &["count"])
        .run()
        .expect_err("invalid label key");
    assert_eq!(
        error.to_string(),
        "step `count` failure: invalid label selector: invalid label key: \"bad key\""
    );
}

fn monitor_store(objects: Vec<Box<dyn ObjectsBuilder>>) -> Arc<InMemoryStore> {
    let mut scheme = Scheme::new();
    add_to_scheme(&mut scheme).expect("register NodesMonitor");
    add_core_to_scheme(&mut scheme).expect("register core kinds");
    let store = InMemoryStore::builder()
        .with_scheme(scheme)
        .with_status_subresource(NodesMonitor::KIND)
        .with_objects(objects.iter().flat_map(|builder| builder.build()))
        .build()
        .expect("seed store");
    assert!(store.scheme().is_registered(NodesMonitor::KIND));
    assert!(store.tracks_status(NodesMonitor::KIND));
    assert!(!store.tracks_status("Node"));
    Arc::new(store)
}

#[test]
fn controller_ignores_missing_monitors() {
    let store = monitor_store(Vec::new());
    let controller = NodesMonitorController::from_store(store);
    let action = controller
        .reconcile(&Request::new(NamespacedKey::new("absent", DEFAULT_NAMESPACE)))
        .expect("missing monitor is not an error");
    assert!(!action.should_requeue());
}

#[test]
fn controller_toggles_activity_then_counts() {
    let store = monitor_store(vec![
        SetupHelper::new().workers(3).boxed(),
        NodesMonitorBuilder::new("nodes-counter").active().alert_threshold(5).boxed(),
    ]);
    let controller = NodesMonitorController::from_store(store.clone());
    let request = Request::new(NamespacedKey::new("nodes-counter", DEFAULT_NAMESPACE));

    let first = controller.reconcile(&request).expect("first reconcile");
    assert!(first.should_requeue());
    assert_eq!(first.delay(), None);
    let monitor: NodesMonitor = store.get(&request.key).expect("monitor stored");
    assert!(monitor.status.active);
    assert_eq!(monitor.status.num_nodes, 0);

    let second = controller.reconcile(&request).expect("second reconcile");
    assert_eq!(second.delay(), Some(RESYNC_PERIOD));
    let monitor: NodesMonitor = store.get(&request.key).expect("monitor stored");
    assert_eq!(monitor.status.num_nodes, 3);
    assert_eq!(latest_status(&monitor), Some(ConditionStatus::False));
}
