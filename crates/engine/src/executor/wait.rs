//! Condition step execution.
//!
//! This module owns the bounded reconcile-until loop and keeps the step
//! sequencing in `executor::mod` focused on target tracking and step flow.

use settle_store::{ObjectStore, ObjectStoreExt};
use settle_types::{NamespacedKey, Resource};
use tracing::{debug, info, warn};

use crate::{
    error::ScenarioError,
    model::{Predicate, StepAction, default_condition_label},
    reconciler::{ReconcileError, Reconciler, Request},
};

use super::StepEvent;

/// A condition step detached from the step list.
pub(crate) struct WaitStep<T> {
    pub step_index: usize,
    pub condition: Predicate<T>,
    pub action: Option<StepAction<T>>,
    pub label: String,
}

/// How a condition step ended when it did not fail.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Satisfied { attempts: u32 },
    /// The reconciler returned a terminal error.
    Stopped { cause: String },
}

/// Reconcile `target` until the step's condition holds or the budget runs out.
///
/// Each attempt invokes the reconciler once, re-fetches the target (a missing
/// record is passed as `T::default()`) and evaluates the condition. Reconciler
/// and fetch errors are not retried.
pub(crate) fn wait_for_condition<R, T>(
    step: WaitStep<T>,
    target: &NamespacedKey,
    reconciler: &R,
    store: &dyn ObjectStore,
    retry_budget: u32,
    observer: &mut dyn FnMut(&StepEvent),
) -> Result<WaitOutcome, ScenarioError>
where
    R: Reconciler,
    T: Resource,
{
    let WaitStep {
        step_index,
        mut condition,
        action,
        label,
    } = step;
    let request = Request::new(target.clone());

    info!(step_index, label = %label, key = %target, retry_budget, "condition step started");

    for attempt in 1..=retry_budget {
        observer(&StepEvent::ReconcileAttempt {
            step_index,
            attempt,
            key: target.clone(),
        });

        match reconciler.reconcile(&request) {
            Ok(hints) => debug!(step_index, attempt, requeue = hints.should_requeue(), "reconcile returned"),
            Err(ReconcileError::Terminal(cause)) => {
                info!(step_index, attempt, cause = %cause, "reconciler returned a terminal error; stopping run");
                return Ok(WaitOutcome::Stopped { cause: cause.to_string() });
            }
            Err(ReconcileError::Failed(cause)) => {
                warn!(step_index, attempt, cause = %cause, "reconcile failed");
                return Err(ScenarioError::step(&label, cause));
            }
        }

        let mut latest: T = match store.get::<T>(target) {
            Ok(record) => record,
            Err(error) if error.is_not_found() => T::default(),
            Err(error) => {
                warn!(step_index, attempt, error = %error, "failed to fetch target");
                return Err(ScenarioError::step(&label, error));
            }
        };

        if condition(store, &latest) {
            info!(step_index, attempts = attempt, "condition satisfied");
            observer(&StepEvent::ConditionSatisfied {
                step_index,
                attempts: attempt,
            });
            if let Some(action) = action {
                action(store, &mut latest).map_err(|cause| {
                    warn!(step_index, cause = %cause, "step action failed");
                    ScenarioError::step(&label, cause)
                })?;
                debug!(step_index, "step action completed");
                observer(&StepEvent::ActionCompleted { step_index });
            }
            return Ok(WaitOutcome::Satisfied { attempts: attempt });
        }
    }

    let label = if label.is_empty() {
        default_condition_label(step_index)
    } else {
        label
    };
    warn!(step_index, label = %label, retry_budget, "condition not satisfied within retry budget");
    Err(ScenarioError::NotSatisfied {
        label,
        budget: retry_budget,
    })
}
