//! Scenario builder: the public entry point of the engine.
//!
//! A [`Scenario`] accumulates schema registrations, an initial state and an
//! ordered list of steps, then hands them to the executor when run.

use std::marker::PhantomData;

use serde_json::Value;
use settle_store::{ObjectStore, SchemeFn, StoreError};
use settle_types::{NamespacedKey, Object, Resource};
use tracing::debug;

use crate::{
    config::ScenarioConfig,
    error::ScenarioError,
    executor::{self, ExecutionPlan, RunOutcome, StepEvent},
    model::{Predicate, SetupFn, Step, join_labels},
    reconciler::{FromStore, Reconciler},
};

/// Fixture helper producing records to seed into the store.
pub trait ObjectsBuilder {
    fn build(&self) -> Vec<Box<dyn Object>>;

    fn boxed(self) -> Box<dyn ObjectsBuilder>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// Scenario driving reconciler `R`, whose target records are of kind `T`.
///
/// ```
/// use settle_engine::{Action, FromStore, ReconcileError, Reconciler, Request, Scenario, StoreHandle};
/// use settle_store::add_core_to_scheme;
/// use settle_types::{Resource, core::ConfigMap};
///
/// struct Idle;
///
/// impl FromStore for Idle {
///     fn from_store(_store: StoreHandle) -> Self {
///         Idle
///     }
/// }
///
/// impl Reconciler for Idle {
///     fn reconcile(&self, _request: &Request) -> Result<Action, ReconcileError> {
///         Ok(Action::await_change())
///     }
/// }
///
/// Scenario::<Idle, ConfigMap>::new()
///     .with_schemes(&[add_core_to_scheme])
///     .setup_objects(|| vec![ConfigMap::new("settings", "default").boxed()])
///     .next_target(("settings", "default"))
///     .wait_until(|_, record: &ConfigMap| record.name() == "settings", &["settings exists"])
///     .test();
/// ```
pub struct Scenario<R, T> {
    config: ScenarioConfig,
    schemes: Vec<SchemeFn>,
    setup: Option<SetupFn>,
    steps: Vec<Step<T>>,
    observer: Option<executor::Observer>,
    reconciler: PhantomData<fn() -> R>,
}

impl<R, T> Default for Scenario<R, T>
where
    R: Reconciler + FromStore,
    T: Resource,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, T> Scenario<R, T>
where
    R: Reconciler + FromStore,
    T: Resource,
{
    pub fn new() -> Self {
        Self {
            config: ScenarioConfig::default(),
            schemes: Vec::new(),
            setup: None,
            steps: Vec::new(),
            observer: None,
            reconciler: PhantomData,
        }
    }

    pub fn with_config(mut self, config: ScenarioConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the per-condition retry budget. Zero is rejected when the scenario runs.
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.config.retry_budget = retry_budget;
        self
    }

    /// Adds schema registration functions applied to the store before seeding.
    pub fn with_schemes(mut self, schemes: &[SchemeFn]) -> Self {
        self.schemes.extend_from_slice(schemes);
        self
    }

    /// Seeds the store with the records of every builder, in order.
    pub fn setup(self, builders: Vec<Box<dyn ObjectsBuilder>>) -> Self {
        self.setup_objects(move || builders.iter().flat_map(|builder| builder.build()).collect())
    }

    /// Seeds the store with the records returned by `produce`. Replaces any earlier setup.
    pub fn setup_objects<F>(mut self, produce: F) -> Self
    where
        F: FnOnce() -> Vec<Box<dyn Object>> + 'static,
    {
        self.setup = Some(Box::new(produce));
        self
    }

    /// Reconciles `key` in the following condition steps.
    pub fn next_target(mut self, key: impl Into<NamespacedKey>) -> Self {
        self.steps.push(Step::set_target(key.into()));
        self
    }

    /// Creates the produced record when the step runs and targets it.
    ///
    /// Records carrying a status sub-field get their status written right after
    /// creation; kinds not tracked for status skip that write.
    pub fn next_target_object<F>(mut self, produce: F) -> Self
    where
        F: FnOnce() -> Box<dyn Object> + 'static,
    {
        self.steps.push(Step::SetTarget {
            resolve: Box::new(move |store| create_target(store, produce().as_ref())),
        });
        self
    }

    /// Reconciles the current target until `condition` holds.
    ///
    /// The returned value accepts [`PendingCondition::then`] to attach an action
    /// to this condition; any other builder call keeps it as a plain wait.
    pub fn wait_until<P>(self, condition: P, labels: &[&str]) -> PendingCondition<R, T>
    where
        P: FnMut(&dyn ObjectStore, &T) -> bool + 'static,
    {
        PendingCondition {
            scenario: self,
            condition: Box::new(condition),
            label: join_labels(labels),
        }
    }

    /// Registers a callback receiving progress events while the scenario runs.
    pub fn observe<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&StepEvent) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn steps(&self) -> &[Step<T>] {
        &self.steps
    }

    /// Runs every step against a fresh store and reconciler.
    ///
    /// A terminal reconcile error ends the run successfully with
    /// [`RunOutcome::StoppedEarly`]; steps after it are never executed.
    pub fn run(self) -> Result<RunOutcome, ScenarioError> {
        executor::execute::<R, T>(ExecutionPlan {
            config: self.config,
            schemes: self.schemes,
            setup: self.setup,
            steps: self.steps,
            observer: self.observer,
        })
    }

    /// Runs the scenario and panics with the failure message if it fails.
    #[track_caller]
    pub fn test(self) {
        if let Err(error) = self.run() {
            panic!("{error}");
        }
    }
}

/// A condition step that may still receive an action through [`then`](Self::then).
pub struct PendingCondition<R, T> {
    scenario: Scenario<R, T>,
    condition: Predicate<T>,
    label: String,
}

impl<R, T> PendingCondition<R, T>
where
    R: Reconciler + FromStore,
    T: Resource,
{
    /// Runs `action` once, right after the condition first holds.
    ///
    /// The step's label is replaced by `labels`.
    pub fn then<A>(self, action: A, labels: &[&str]) -> Scenario<R, T>
    where
        A: FnOnce(&dyn ObjectStore, &mut T) -> anyhow::Result<()> + 'static,
    {
        let mut scenario = self.scenario;
        scenario.steps.push(Step::WaitForThen {
            condition: self.condition,
            action: Box::new(action),
            label: join_labels(labels),
        });
        scenario
    }

    pub fn next_target(self, key: impl Into<NamespacedKey>) -> Scenario<R, T> {
        Scenario::from(self).next_target(key)
    }

    pub fn next_target_object<F>(self, produce: F) -> Scenario<R, T>
    where
        F: FnOnce() -> Box<dyn Object> + 'static,
    {
        Scenario::from(self).next_target_object(produce)
    }

    pub fn wait_until<P>(self, condition: P, labels: &[&str]) -> PendingCondition<R, T>
    where
        P: FnMut(&dyn ObjectStore, &T) -> bool + 'static,
    {
        Scenario::from(self).wait_until(condition, labels)
    }

    pub fn run(self) -> Result<RunOutcome, ScenarioError> {
        Scenario::from(self).run()
    }

    #[track_caller]
    pub fn test(self) {
        Scenario::from(self).test()
    }
}

impl<R, T> From<PendingCondition<R, T>> for Scenario<R, T> {
    fn from(pending: PendingCondition<R, T>) -> Self {
        let mut scenario = pending.scenario;
        scenario.steps.push(Step::WaitFor {
            condition: pending.condition,
            label: pending.label,
        });
        scenario
    }
}

fn create_target(store: &dyn ObjectStore, object: &dyn Object) -> Result<NamespacedKey, StoreError> {
    let kind = object.kind();
    let value = object.to_value().map_err(|source| StoreError::Serialization {
        kind: kind.to_string(),
        source,
    })?;
    let status = value.get("status").cloned();

    let mut stored = store.create_value(kind, value)?;
    debug!(kind, key = %object.meta().key(), "target record created");

    if object.has_status()
        && let Some(status) = status
    {
        if let Value::Object(fields) = &mut stored {
            fields.insert("status".to_string(), status);
        }
        match store.update_status_value(kind, stored) {
            Ok(_) => {}
            Err(error) if error.is_no_status_subresource() => {
                debug!(kind, "kind is not tracked for status; status write skipped");
            }
            Err(error) => return Err(error),
        }
    }

    Ok(object.meta().key())
}
