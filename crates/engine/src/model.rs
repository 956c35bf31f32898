//! Step model interpreted by the executor.
//!
//! Steps are built through [`Scenario`](crate::Scenario) and executed strictly in
//! declaration order. Nothing is validated at construction time: a condition step
//! placed before any target step simply reconciles the empty key.

use std::fmt;

use settle_store::{ObjectStore, StoreError};
use settle_types::NamespacedKey;

/// Condition evaluated after every reconcile against the freshly fetched target record.
pub type Predicate<T> = Box<dyn FnMut(&dyn ObjectStore, &T) -> bool>;

/// Mutation run once, right after its condition first holds.
pub type StepAction<T> = Box<dyn FnOnce(&dyn ObjectStore, &mut T) -> anyhow::Result<()>>;

/// Deferred resolution of the next target key; may create the record first.
pub type KeyProducer = Box<dyn FnOnce(&dyn ObjectStore) -> Result<NamespacedKey, StoreError>>;

/// Produces the records seeded into the store before the first step.
pub type SetupFn = Box<dyn FnOnce() -> Vec<Box<dyn settle_types::Object>>>;

/// One entry of a scenario.
pub enum Step<T> {
    /// Selects the key handed to the reconciler by subsequent condition steps.
    SetTarget { resolve: KeyProducer },
    /// Reconciles until `condition` holds.
    WaitFor { condition: Predicate<T>, label: String },
    /// Reconciles until `condition` holds, then runs `action` exactly once.
    WaitForThen {
        condition: Predicate<T>,
        action: StepAction<T>,
        label: String,
    },
}

impl<T> Step<T> {
    pub fn set_target(key: NamespacedKey) -> Self {
        Step::SetTarget {
            resolve: Box::new(move |_| Ok(key)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Step::SetTarget { .. } => "",
            Step::WaitFor { label, .. } | Step::WaitForThen { label, .. } => label,
        }
    }

    pub fn is_condition(&self) -> bool {
        !matches!(self, Step::SetTarget { .. })
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::SetTarget { .. } => f.write_str("SetTarget"),
            Step::WaitFor { label, .. } => f.debug_struct("WaitFor").field("label", label).finish(),
            Step::WaitForThen { label, .. } => f.debug_struct("WaitForThen").field("label", label).finish(),
        }
    }
}

/// Joins free-text labels into a single diagnostic string.
pub(crate) fn join_labels(labels: &[&str]) -> String {
    labels.join(", ")
}

/// Label reported when a condition step without a label exhausts its budget.
pub(crate) fn default_condition_label(step_index: usize) -> String {
    format!("waiting condition #{step_index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_comma_joined() {
        assert_eq!(join_labels(&[]), "");
        assert_eq!(join_labels(&["first", "second"]), "first, second");
    }

    #[test]
    fn set_target_steps_have_no_label() {
        let step: Step<()> = Step::set_target(NamespacedKey::cluster_scoped("a"));
        assert_eq!(step.label(), "");
        assert!(!step.is_condition());
        assert_eq!(format!("{step:?}"), "SetTarget");
    }
}
