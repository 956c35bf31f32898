//! # Settle Store
//!
//! Memory-resident object store backing a single scenario run.
//!
//! - [`Scheme`] records which kinds a store accepts (and which carry a status sub-field)
//! - [`ObjectStore`] is the object-safe capability handed to reconcilers
//! - [`ObjectStoreExt`] layers typed access over any [`ObjectStore`]
//! - [`InMemoryStore`] is the isolated implementation built fresh for every run

mod error;
mod memory;
mod scheme;
mod selector;

pub use error::{StoreError, ignore_not_found};
pub use memory::{InMemoryStore, InMemoryStoreBuilder};
pub use scheme::{KindInfo, Scheme, SchemeError, SchemeFn, add_core_to_scheme};
pub use selector::{LabelSelector, ListOptions, Requirement};

use serde_json::Value;
use settle_types::{NamespacedKey, Resource};

/// Value-level store operations keyed by kind name.
///
/// The trait stays object-safe so a store can be shared as `Arc<dyn ObjectStore>`;
/// typed access lives in [`ObjectStoreExt`].
pub trait ObjectStore: Send + Sync {
    /// Fetch the record stored under `key`.
    fn get_value(&self, kind: &str, key: &NamespacedKey) -> Result<Value, StoreError>;

    /// List records of `kind` matching the provided options, ordered by namespace then name.
    fn list_values(&self, kind: &str, options: &ListOptions) -> Result<Vec<Value>, StoreError>;

    /// Insert a new record, returning the stored form (with its assigned resource version).
    fn create_value(&self, kind: &str, value: Value) -> Result<Value, StoreError>;

    /// Replace the primary fields of an existing record.
    fn update_value(&self, kind: &str, value: Value) -> Result<Value, StoreError>;

    /// Replace only the `status` sub-field of an existing record.
    fn update_status_value(&self, kind: &str, value: Value) -> Result<Value, StoreError>;

    fn delete_value(&self, kind: &str, key: &NamespacedKey) -> Result<(), StoreError>;
}

/// Typed helpers over [`ObjectStore`].
///
/// Write operations decode the stored form back into the caller's record so the
/// new resource version (and, for status-tracked kinds, the authoritative status)
/// is visible after the call.
pub trait ObjectStoreExt: ObjectStore {
    fn get<T: Resource>(&self, key: &NamespacedKey) -> Result<T, StoreError> {
        decode(self.get_value(T::KIND, key)?)
    }

    fn list<T: Resource>(&self, options: &ListOptions) -> Result<Vec<T>, StoreError> {
        self.list_values(T::KIND, options)?.into_iter().map(decode).collect()
    }

    fn create<T: Resource>(&self, record: &mut T) -> Result<(), StoreError> {
        let stored = self.create_value(T::KIND, encode(record)?)?;
        *record = decode(stored)?;
        Ok(())
    }

    fn update<T: Resource>(&self, record: &mut T) -> Result<(), StoreError> {
        let stored = self.update_value(T::KIND, encode(record)?)?;
        *record = decode(stored)?;
        Ok(())
    }

    fn update_status<T: Resource>(&self, record: &mut T) -> Result<(), StoreError> {
        let stored = self.update_status_value(T::KIND, encode(record)?)?;
        *record = decode(stored)?;
        Ok(())
    }

    fn delete<T: Resource>(&self, record: &T) -> Result<(), StoreError> {
        self.delete_value(T::KIND, &record.key())
    }
}

impl<S: ObjectStore + ?Sized> ObjectStoreExt for S {}

fn encode<T: Resource>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Serialization {
        kind: T::KIND.to_string(),
        source,
    })
}

fn decode<T: Resource>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Serialization {
        kind: T::KIND.to_string(),
        source,
    })
}
