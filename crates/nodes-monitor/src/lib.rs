//! # Settle Nodes Monitor
//!
//! A small control loop counting the nodes of a cluster, used to show how a
//! reconciler is exercised through `settle-engine` scenarios.
//!
//! - [`NodesMonitor`] is the watched record; its status carries the node count
//!   and a history of threshold transitions
//! - [`NodesMonitorController`] keeps that status current
//! - [`builders`] produces seed records for scenarios

pub mod builders;
mod controller;
mod resource;

pub use controller::{NodesMonitorController, RESYNC_PERIOD};
pub use resource::{NodesMonitor, NodesMonitorSpec, NodesMonitorStatus, THRESHOLD_EXCEEDED, add_to_scheme};
