//! Label selectors and list options.

use once_cell::sync::Lazy;
use regex::Regex;
use settle_types::Labels;

use crate::StoreError;

/// Qualified label key: optional DNS-subdomain prefix followed by a name of at most 63 characters.
static LABEL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*/)?[A-Za-z0-9]([-A-Za-z0-9_.]{0,61}[A-Za-z0-9])?$",
    )
    .expect("valid label key pattern")
});

static LABEL_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]([-A-Za-z0-9_.]{0,61}[A-Za-z0-9])?)?$").expect("valid label value pattern"));

/// A single label constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// The label must be present; its value is ignored.
    Exists(String),
    /// The label must be present with exactly this value.
    Equals(String, String),
}

impl Requirement {
    pub fn exists(key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Requirement::Exists(key))
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        let value = value.into();
        validate_key(&key)?;
        if !LABEL_VALUE.is_match(&value) {
            return Err(StoreError::InvalidSelector(format!("invalid label value: \"{value}\"")));
        }
        Ok(Requirement::Equals(key, value))
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        match self {
            Requirement::Exists(key) => labels.contains_key(key),
            Requirement::Equals(key, value) => labels.get(key).is_some_and(|actual| actual == value),
        }
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.len() > 316 || !LABEL_KEY.is_match(key) {
        return Err(StoreError::InvalidSelector(format!("invalid label key: \"{key}\"")));
    }
    Ok(())
}

/// Conjunction of label requirements. An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.requirements.iter().all(|requirement| requirement.matches(labels))
    }
}

/// Filters applied by `list` operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Restrict results to a single namespace.
    pub namespace: Option<String>,
    pub label_selector: Option<LabelSelector>,
}

impl ListOptions {
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_selector(mut self, selector: LabelSelector) -> Self {
        self.label_selector = Some(selector);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
    }

    #[test]
    fn exists_ignores_label_value() {
        let requirement = Requirement::exists("node-role.kubernetes.io/control-plane").expect("valid key");
        assert!(requirement.matches(&labels(&[("node-role.kubernetes.io/control-plane", "")])));
        assert!(!requirement.matches(&labels(&[("node-role.kubernetes.io/worker", "")])));
    }

    #[test]
    fn selector_requires_every_requirement() {
        let selector = LabelSelector::new()
            .add(Requirement::exists("tier").expect("valid key"))
            .add(Requirement::equals("zone", "a").expect("valid requirement"));
        assert!(selector.matches(&labels(&[("tier", "web"), ("zone", "a")])));
        assert!(!selector.matches(&labels(&[("tier", "web"), ("zone", "b")])));
        assert!(LabelSelector::new().matches(&Labels::new()));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for key in ["", "-leading", "bad key", "UPPER.example.com/name"] {
            let error = Requirement::exists(key).expect_err("key should be rejected");
            assert!(error.to_string().contains("invalid label key"), "unexpected error: {error}");
        }
    }
}
