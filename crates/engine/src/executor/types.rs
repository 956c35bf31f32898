//! Core executor data types.

use settle_types::NamespacedKey;

/// Successful end of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step ran to completion.
    Completed,
    /// The reconciler returned a terminal error; remaining steps were not executed.
    StoppedEarly {
        /// Index of the condition step that observed the terminal error.
        step_index: usize,
        /// Rendered terminal error.
        cause: String,
    },
}

impl RunOutcome {
    pub fn is_stopped_early(&self) -> bool {
        matches!(self, RunOutcome::StoppedEarly { .. })
    }
}

/// Progress notification emitted while a scenario runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// A target step resolved the key for subsequent condition steps.
    TargetSet { step_index: usize, key: NamespacedKey },
    /// The reconciler is about to be invoked (`attempt` starts at 1).
    ReconcileAttempt {
        step_index: usize,
        attempt: u32,
        key: NamespacedKey,
    },
    ConditionSatisfied { step_index: usize, attempts: u32 },
    /// The action attached to a condition step returned successfully.
    ActionCompleted { step_index: usize },
}

/// Callback receiving [`StepEvent`]s.
pub type Observer = Box<dyn FnMut(&StepEvent)>;
