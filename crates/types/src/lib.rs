//! # Settle Types
//!
//! Record model shared by the in-memory object store, the scenario engine and
//! the reconcilers exercised through it.
//!
//! - [`NamespacedKey`] identifies a record (`namespace/name`, namespace optional)
//! - [`ObjectMeta`] carries the identity, labels and resource version of a record
//! - [`Resource`] is the typed contract every record kind implements
//! - [`Object`] is the object-safe view used for heterogeneous record lists
//! - [`core`] holds the built-in kinds (`ConfigMap`, `Node`)

pub mod core;
mod key;
mod meta;
mod resource;

pub use key::NamespacedKey;
pub use meta::{Condition, ConditionStatus, Labels, ObjectMeta};
pub use resource::{Object, Resource};
