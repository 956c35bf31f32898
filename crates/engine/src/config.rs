//! Scenario configuration.
//!
//! Defaults are plain values passed into every run; nothing is read from global
//! state once a scenario starts, so concurrent runs stay independent.

use std::env;

use thiserror::Error;

/// Environment variable overriding the per-condition retry budget.
///
/// Only honored through [`ScenarioConfig::from_env`]; `Scenario::new` starts from the defaults.
pub const RETRY_BUDGET_ENV: &str = "SETTLE_RETRY_BUDGET";

/// Reconcile invocations attempted per condition step unless overridden.
pub const DEFAULT_RETRY_BUDGET: u32 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid SETTLE_RETRY_BUDGET value \"{0}\": expected a positive integer")]
    InvalidRetryBudget(String),
}

/// Settings applied to a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Maximum reconcile invocations per condition step.
    pub retry_budget: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

impl ScenarioConfig {
    /// Reads overrides from the environment, falling back to defaults when unset or blank.
    ///
    /// Scenarios never read the environment themselves; pass the result to
    /// `Scenario::with_config` for it to take effect.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = env::var(RETRY_BUDGET_ENV)
            && !raw.trim().is_empty()
        {
            config.retry_budget = parse_retry_budget(&raw)?;
        }
        Ok(config)
    }
}

fn parse_retry_budget(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(budget) if budget > 0 => Ok(budget),
        _ => Err(ConfigError::InvalidRetryBudget(raw.to_string())),
    }
}
