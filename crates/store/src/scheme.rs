//! Kind registration for object stores.
//!
//! A store only accepts records whose kind was registered up front. Registration
//! is performed by plain functions (see [`SchemeFn`]) so crates that define
//! record kinds can expose an `add_to_scheme` entry point of their own.

use indexmap::IndexMap;
use settle_types::{
    Resource,
    core::{ConfigMap, Node},
};
use thiserror::Error;

/// Errors raised while registering kinds.
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("kind \"{kind}\" is already registered with a different status setting")]
    ConflictingRegistration { kind: String },

    #[error("invalid kind name: \"{0}\"")]
    InvalidKind(String),

    /// Failure reported by a custom registration function.
    #[error("{0}")]
    Registration(String),
}

/// Registration function applied to a fresh [`Scheme`].
pub type SchemeFn = fn(&mut Scheme) -> Result<(), SchemeError>;

/// Registration details for a single kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub kind: &'static str,
    pub has_status: bool,
}

/// Set of kinds a store accepts.
#[derive(Debug, Clone, Default)]
pub struct Scheme {
    kinds: IndexMap<&'static str, KindInfo>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a typed kind. Registering the same kind twice is a no-op.
    pub fn register<T: Resource>(&mut self) -> Result<(), SchemeError> {
        self.register_kind(T::KIND, T::HAS_STATUS)
    }

    pub fn register_kind(&mut self, kind: &'static str, has_status: bool) -> Result<(), SchemeError> {
        if kind.trim().is_empty() {
            return Err(SchemeError::InvalidKind(kind.to_string()));
        }
        match self.kinds.get(kind) {
            Some(existing) if existing.has_status != has_status => {
                Err(SchemeError::ConflictingRegistration { kind: kind.to_string() })
            }
            Some(_) => Ok(()),
            None => {
                self.kinds.insert(kind, KindInfo { kind, has_status });
                Ok(())
            }
        }
    }

    pub fn kind(&self, kind: &str) -> Option<&KindInfo> {
        self.kinds.get(kind)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &KindInfo> {
        self.kinds.values()
    }
}

/// Registers the built-in kinds (`ConfigMap`, `Node`).
pub fn add_core_to_scheme(scheme: &mut Scheme) -> Result<(), SchemeError> {
    scheme.register::<ConfigMap>()?;
    scheme.register::<Node>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let mut scheme = Scheme::new();
        add_core_to_scheme(&mut scheme).expect("first registration");
        add_core_to_scheme(&mut scheme).expect("second registration");

        let kinds: Vec<_> = scheme.kinds().map(|info| info.kind).collect();
        assert_eq!(kinds, vec!["ConfigMap", "Node"]);
        assert!(scheme.kind("Node").is_some_and(|info| info.has_status));
    }

    #[test]
    fn conflicting_status_setting_is_rejected() {
        let mut scheme = Scheme::new();
        scheme.register_kind("Widget", false).expect("register");
        let error = scheme.register_kind("Widget", true).expect_err("should conflict");
        assert!(error.to_string().contains("different status setting"), "unexpected error: {error}");
    }

    #[test]
    fn blank_kind_is_rejected() {
        let mut scheme = Scheme::new();
        assert!(matches!(scheme.register_kind(" ", false), Err(SchemeError::InvalidKind(_))));
    }
}
