//! # Settle Engine
//!
//! Scenario-driven test harness for reconcile loops. A scenario seeds an
//! isolated in-memory store, binds a reconciler to it, and then walks an ordered
//! list of steps: target steps pick the record handed to the reconciler, and
//! condition steps reconcile that record until a predicate over the store holds
//! or the retry budget runs out.
//!
//! ## Terminal reconcile errors
//!
//! A reconciler returning [`ReconcileError::Terminal`] ends the **whole run
//! successfully**. Later steps are not executed; [`Scenario::run`] reports this as
//! [`RunOutcome::StoppedEarly`] and [`Scenario::test`] passes. Do not rely on
//! steps after a terminal error for assertions.
//!
//! ## Architecture
//!
//! - **`model`**: step variants and closure types
//! - **`scenario`**: the builder and its `run`/`test` entry points
//! - **`executor`**: store construction, reconciler injection and the bounded wait loop
//! - **`reconciler`**: the contracts implemented by the control loop under test
//! - **`config`**: retry budget defaults and environment overrides

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod model;
pub mod reconciler;
pub mod scenario;

pub use config::{ConfigError, DEFAULT_RETRY_BUDGET, RETRY_BUDGET_ENV, ScenarioConfig};
pub use error::ScenarioError;
pub use executor::{Observer, RunOutcome, StepEvent};
pub use logging::init_tracing;
pub use model::Step;
pub use reconciler::{Action, FromStore, ReconcileError, Reconciler, Request, StoreHandle};
pub use scenario::{ObjectsBuilder, PendingCondition, Scenario};
