//! Contracts a reconciler must satisfy to be driven by a scenario.
//!
//! A reconciler is built by the engine itself: [`FromStore::from_store`] receives
//! the isolated store of the current run, and [`Reconciler::reconcile`] is then
//! invoked with the scenario's current target key.

use std::{sync::Arc, time::Duration};

use settle_store::{ObjectStore, StoreError};
use settle_types::NamespacedKey;
use thiserror::Error;

/// Shared handle to the store injected into a reconciler.
pub type StoreHandle = Arc<dyn ObjectStore>;

/// Key handed to a single reconcile invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub key: NamespacedKey,
}

impl Request {
    pub fn new(key: NamespacedKey) -> Self {
        Self { key }
    }
}

/// Scheduling hints returned by a successful reconcile.
///
/// Scenarios never wait on these; reconcile invocations inside a condition step
/// are issued back to back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Action {
    requeue: bool,
    requeue_after: Option<Duration>,
}

impl Action {
    /// Nothing left to do until the record changes again.
    pub fn await_change() -> Self {
        Self::default()
    }

    pub fn requeue() -> Self {
        Self {
            requeue: true,
            requeue_after: None,
        }
    }

    pub fn requeue_after(delay: Duration) -> Self {
        Self {
            requeue: true,
            requeue_after: Some(delay),
        }
    }

    pub fn should_requeue(&self) -> bool {
        self.requeue
    }

    pub fn delay(&self) -> Option<Duration> {
        self.requeue_after
    }
}

/// Error outcome of a reconcile invocation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The reconciler gave up on this record for good.
    ///
    /// A scenario treats this as an immediate, successful end of the whole run:
    /// later steps are not executed.
    #[error("terminal error: {0}")]
    Terminal(anyhow::Error),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn terminal(cause: impl Into<anyhow::Error>) -> Self {
        ReconcileError::Terminal(cause.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconcileError::Terminal(_))
    }
}

impl From<StoreError> for ReconcileError {
    fn from(error: StoreError) -> Self {
        ReconcileError::Failed(error.into())
    }
}

/// Control loop under test.
pub trait Reconciler {
    fn reconcile(&self, request: &Request) -> Result<Action, ReconcileError>;
}

/// Construction contract used by the engine to bind a reconciler to the store of a run.
pub trait FromStore: Sized {
    fn from_store(store: StoreHandle) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn terminal_errors_are_distinguished() {
        let terminal = ReconcileError::terminal(anyhow!("unrecoverable error"));
        assert!(terminal.is_terminal());
        assert_eq!(terminal.to_string(), "terminal error: unrecoverable error");

        let failed: ReconcileError = anyhow!("boom").into();
        assert!(!failed.is_terminal());
        assert_eq!(failed.to_string(), "boom");
    }

    #[test]
    fn requeue_hints_are_exposed() {
        assert!(!Action::await_change().should_requeue());
        let action = Action::requeue_after(Duration::from_secs(60));
        assert!(action.should_requeue());
        assert_eq!(action.delay(), Some(Duration::from_secs(60)));
    }
}
