//! Execution engine: builds an isolated store for a run, binds the reconciler
//! to it and interprets the step list in declaration order.
//!
//! - Target steps update the key handed to the reconciler
//! - Condition steps run the bounded reconcile-until loop in [`wait`]
//! - The first failure aborts the run; a terminal reconcile error ends it successfully

use std::sync::Arc;

use settle_store::{InMemoryStore, Scheme, SchemeFn};
use settle_types::{NamespacedKey, Resource};
use tracing::{debug, info, warn};

use crate::{
    config::ScenarioConfig,
    error::ScenarioError,
    model::{SetupFn, Step},
    reconciler::{FromStore, Reconciler, StoreHandle},
};

mod types;
mod wait;

pub use types::{Observer, RunOutcome, StepEvent};
use wait::{WaitOutcome, WaitStep, wait_for_condition};

/// Everything a run needs, detached from the scenario builder.
pub(crate) struct ExecutionPlan<T> {
    pub config: ScenarioConfig,
    pub schemes: Vec<SchemeFn>,
    pub setup: Option<SetupFn>,
    pub steps: Vec<Step<T>>,
    pub observer: Option<Observer>,
}

/// Execute a plan against a fresh store and reconciler instance.
///
/// Configuration problems (no steps, zero budget) are reported before any store
/// or reconciler is created.
pub(crate) fn execute<R, T>(plan: ExecutionPlan<T>) -> Result<RunOutcome, ScenarioError>
where
    R: Reconciler + FromStore,
    T: Resource,
{
    let ExecutionPlan {
        config,
        schemes,
        setup,
        steps,
        observer,
    } = plan;

    if steps.is_empty() {
        return Err(ScenarioError::NoSteps);
    }
    if config.retry_budget == 0 {
        return Err(ScenarioError::InvalidRetryBudget);
    }

    let store = build_store(&schemes, setup)?;
    let reconciler = R::from_store(Arc::clone(&store));
    let mut observer = observer.unwrap_or_else(|| Box::new(|_: &StepEvent| {}));

    info!(steps = steps.len(), retry_budget = config.retry_budget, resource = T::KIND, "scenario started");

    let mut target = NamespacedKey::default();
    for (step_index, step) in steps.into_iter().enumerate() {
        let wait_step = match step {
            Step::SetTarget { resolve } => {
                target = resolve(store.as_ref()).map_err(|error| {
                    warn!(step_index, error = %error, "failed to resolve target");
                    ScenarioError::step("", error)
                })?;
                info!(step_index, key = %target, "target set");
                observer(&StepEvent::TargetSet {
                    step_index,
                    key: target.clone(),
                });
                continue;
            }
            Step::WaitFor { condition, label } => WaitStep {
                step_index,
                condition,
                action: None,
                label,
            },
            Step::WaitForThen { condition, action, label } => WaitStep {
                step_index,
                condition,
                action: Some(action),
                label,
            },
        };

        match wait_for_condition(wait_step, &target, &reconciler, store.as_ref(), config.retry_budget, &mut observer)? {
            WaitOutcome::Satisfied { attempts } => debug!(step_index, attempts, "condition step finished"),
            WaitOutcome::Stopped { cause } => {
                info!(step_index, "scenario stopped early by terminal reconcile error");
                return Ok(RunOutcome::StoppedEarly { step_index, cause });
            }
        }
    }

    info!("scenario completed");
    Ok(RunOutcome::Completed)
}

/// Applies registration functions, seeds the initial records and tracks status
/// writes separately for every seeded kind that carries a status sub-field.
fn build_store(schemes: &[SchemeFn], setup: Option<SetupFn>) -> Result<StoreHandle, ScenarioError> {
    let mut scheme = Scheme::new();
    for add_to_scheme in schemes {
        add_to_scheme(&mut scheme)?;
    }

    let objects = setup.map(|produce| produce()).unwrap_or_default();
    let mut builder = InMemoryStore::builder().with_scheme(scheme);
    for object in objects.iter().filter(|object| object.has_status()) {
        builder = builder.with_status_subresource(object.kind());
    }
    let store = builder.with_objects(objects).build().map_err(ScenarioError::Setup)?;
    debug!(records = store.len(), "scenario store seeded");

    Ok(Arc::new(store))
}
