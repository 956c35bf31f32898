use settle_store::{SchemeError, StoreError};
use thiserror::Error;

/// Failure of a scenario run.
///
/// A run reports at most one failure: the first one encountered aborts it.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("no steps found")]
    NoSteps,

    #[error("retry budget must be a positive integer")]
    InvalidRetryBudget,

    #[error(transparent)]
    Scheme(#[from] SchemeError),

    /// Seeding the initial records into the store failed.
    #[error(transparent)]
    Setup(StoreError),

    /// A target could not be resolved, the reconciler failed, or an action failed.
    #[error("step `{label}` failure: {cause}")]
    Step { label: String, cause: anyhow::Error },

    #[error("`{label}` not satisfied, too many reconcile loops ({budget})")]
    NotSatisfied { label: String, budget: u32 },
}

impl ScenarioError {
    pub(crate) fn step(label: &str, cause: impl Into<anyhow::Error>) -> Self {
        ScenarioError::Step {
            label: label.to_string(),
            cause: cause.into(),
        }
    }

    /// Whether the run failed before any step executed.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ScenarioError::NoSteps | ScenarioError::InvalidRetryBudget | ScenarioError::Scheme(_) | ScenarioError::Setup(_)
        )
    }
}
