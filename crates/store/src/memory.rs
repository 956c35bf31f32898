//! In-memory object store.
//!
//! Records are kept as JSON values keyed by `(kind, namespace/name)`. Every store
//! owns its data outright, so independent scenario runs never observe each
//! other's writes.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};

use serde_json::Value;
use settle_types::{NamespacedKey, Object, ObjectMeta};
use tracing::debug;

use crate::{ListOptions, ObjectStore, Scheme, StoreError};

const NAME_REQUIRED: &str = "metadata.name: Required value: name is required";

#[derive(Default)]
struct StoreState {
    records: BTreeMap<(String, NamespacedKey), Value>,
    last_version: u64,
}

impl StoreState {
    fn next_version(&mut self) -> String {
        self.last_version += 1;
        self.last_version.to_string()
    }
}

/// Isolated, memory-resident [`ObjectStore`].
pub struct InMemoryStore {
    scheme: Scheme,
    status_kinds: HashSet<String>,
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Whether status writes for `kind` are tracked separately from the primary fields.
    pub fn tracks_status(&self, kind: &str) -> bool {
        self.status_kinds.contains(kind)
    }

    /// Number of records currently stored across all kinds.
    pub fn len(&self) -> usize {
        self.state.lock().expect("store lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_registered(&self, kind: &str) -> Result<(), StoreError> {
        if self.scheme.is_registered(kind) {
            Ok(())
        } else {
            Err(StoreError::UnregisteredKind { kind: kind.to_string() })
        }
    }
}

impl ObjectStore for InMemoryStore {
    fn get_value(&self, kind: &str, key: &NamespacedKey) -> Result<Value, StoreError> {
        self.ensure_registered(kind)?;
        let state = self.state.lock().expect("store lock poisoned");
        state
            .records
            .get(&(kind.to_string(), key.clone()))
            .cloned()
            .ok_or_else(|| not_found(kind, &key.name))
    }

    fn list_values(&self, kind: &str, options: &ListOptions) -> Result<Vec<Value>, StoreError> {
        self.ensure_registered(kind)?;
        let state = self.state.lock().expect("store lock poisoned");
        let mut matched = Vec::new();
        for ((record_kind, key), value) in &state.records {
            if record_kind != kind {
                continue;
            }
            if let Some(namespace) = &options.namespace
                && &key.namespace != namespace
            {
                continue;
            }
            if let Some(selector) = &options.label_selector {
                let meta = metadata_of(kind, value)?;
                if !selector.matches(&meta.labels) {
                    continue;
                }
            }
            matched.push(value.clone());
        }
        Ok(matched)
    }

    fn create_value(&self, kind: &str, mut value: Value) -> Result<Value, StoreError> {
        self.ensure_registered(kind)?;
        // Status of status-tracked kinds is only writable through `update_status_value`.
        if self.status_kinds.contains(kind) {
            replace_field(&mut value, "status", None);
        }
        let mut state = self.state.lock().expect("store lock poisoned");
        insert_new(&mut state, kind, value)
    }

    fn update_value(&self, kind: &str, value: Value) -> Result<Value, StoreError> {
        self.ensure_registered(kind)?;
        let meta = metadata_of(kind, &value)?;
        let record_key = (kind.to_string(), meta.key());
        let mut state = self.state.lock().expect("store lock poisoned");
        let current = state.records.get(&record_key).ok_or_else(|| not_found(kind, &meta.name))?;
        let current_meta = metadata_of(kind, current)?;
        check_version(kind, &meta, &current_meta)?;

        let mut updated = value;
        if self.status_kinds.contains(kind) {
            replace_field(&mut updated, "status", current.get("status").cloned());
        }
        let generation = if primary_fields_changed(current, &updated) {
            current_meta.generation + 1
        } else {
            current_meta.generation
        };
        let version = state.next_version();
        stamp(&mut updated, &version, generation);
        debug!(kind, key = %record_key.1, resource_version = %version, generation, "record updated");
        state.records.insert(record_key, updated.clone());
        Ok(updated)
    }

    fn update_status_value(&self, kind: &str, value: Value) -> Result<Value, StoreError> {
        self.ensure_registered(kind)?;
        let meta = metadata_of(kind, &value)?;
        if !self.status_kinds.contains(kind) {
            return Err(StoreError::NoStatusSubresource {
                kind: kind.to_string(),
                name: meta.name,
            });
        }
        let record_key = (kind.to_string(), meta.key());
        let mut state = self.state.lock().expect("store lock poisoned");
        let current = state.records.get(&record_key).ok_or_else(|| not_found(kind, &meta.name))?;
        let current_meta = metadata_of(kind, current)?;
        check_version(kind, &meta, &current_meta)?;

        let mut updated = current.clone();
        replace_field(&mut updated, "status", value.get("status").cloned());
        let version = state.next_version();
        stamp(&mut updated, &version, current_meta.generation);
        debug!(kind, key = %record_key.1, resource_version = %version, "record status updated");
        state.records.insert(record_key, updated.clone());
        Ok(updated)
    }

    fn delete_value(&self, kind: &str, key: &NamespacedKey) -> Result<(), StoreError> {
        self.ensure_registered(kind)?;
        let mut state = self.state.lock().expect("store lock poisoned");
        match state.records.remove(&(kind.to_string(), key.clone())) {
            Some(_) => {
                debug!(kind, key = %key, "record deleted");
                Ok(())
            }
            None => Err(not_found(kind, &key.name)),
        }
    }
}

/// Builder for [`InMemoryStore`], seeding records before the first reconcile.
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    scheme: Scheme,
    objects: Vec<Box<dyn Object>>,
    status_kinds: HashSet<String>,
}

impl InMemoryStoreBuilder {
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Records inserted when the store is built, in the given order.
    pub fn with_objects(mut self, objects: impl IntoIterator<Item = Box<dyn Object>>) -> Self {
        self.objects.extend(objects);
        self
    }

    /// Tracks status writes for `kind` separately from its primary fields.
    pub fn with_status_subresource(mut self, kind: impl Into<String>) -> Self {
        self.status_kinds.insert(kind.into());
        self
    }

    pub fn build(self) -> Result<InMemoryStore, StoreError> {
        for kind in &self.status_kinds {
            if !self.scheme.is_registered(kind) {
                return Err(StoreError::UnregisteredKind { kind: kind.clone() });
            }
        }

        let mut state = StoreState::default();
        for object in &self.objects {
            let kind = object.kind();
            if !self.scheme.is_registered(kind) {
                return Err(StoreError::UnregisteredKind { kind: kind.to_string() });
            }
            let value = object.to_value().map_err(|source| StoreError::Serialization {
                kind: kind.to_string(),
                source,
            })?;
            insert_new(&mut state, kind, value)?;
        }
        debug!(records = state.records.len(), status_kinds = self.status_kinds.len(), "in-memory store built");

        Ok(InMemoryStore {
            scheme: self.scheme,
            status_kinds: self.status_kinds,
            state: Mutex::new(state),
        })
    }
}

fn insert_new(state: &mut StoreState, kind: &str, mut value: Value) -> Result<Value, StoreError> {
    let meta = metadata_of(kind, &value)?;
    if meta.name.is_empty() {
        return Err(StoreError::Invalid {
            kind: kind.to_string(),
            name: meta.name,
            reason: NAME_REQUIRED.to_string(),
        });
    }
    let record_key = (kind.to_string(), meta.key());
    if state.records.contains_key(&record_key) {
        return Err(StoreError::AlreadyExists {
            kind: kind.to_string(),
            name: meta.name,
        });
    }
    let version = state.next_version();
    stamp(&mut value, &version, 1);
    debug!(kind, key = %record_key.1, resource_version = %version, "record created");
    state.records.insert(record_key, value.clone());
    Ok(value)
}

fn metadata_of(kind: &str, value: &Value) -> Result<ObjectMeta, StoreError> {
    let metadata = value.get("metadata").cloned().unwrap_or(Value::Null);
    if metadata.is_null() {
        return Ok(ObjectMeta::default());
    }
    serde_json::from_value(metadata).map_err(|source| StoreError::Serialization {
        kind: kind.to_string(),
        source,
    })
}

fn check_version(kind: &str, incoming: &ObjectMeta, current: &ObjectMeta) -> Result<(), StoreError> {
    if !incoming.resource_version.is_empty() && incoming.resource_version != current.resource_version {
        return Err(StoreError::Conflict {
            kind: kind.to_string(),
            name: incoming.name.clone(),
        });
    }
    Ok(())
}

fn replace_field(value: &mut Value, field: &str, replacement: Option<Value>) {
    if let Value::Object(map) = value {
        match replacement {
            Some(replacement) => {
                map.insert(field.to_string(), replacement);
            }
            None => {
                map.remove(field);
            }
        }
    }
}

fn stamp(value: &mut Value, resource_version: &str, generation: u64) {
    if let Value::Object(map) = value {
        let metadata = map.entry("metadata").or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(metadata) = metadata {
            metadata.insert("resourceVersion".into(), Value::String(resource_version.to_string()));
            metadata.insert("generation".into(), Value::from(generation));
        }
    }
}

/// Compares everything except `metadata` and `status`.
fn primary_fields_changed(current: &Value, updated: &Value) -> bool {
    let strip = |value: &Value| match value {
        Value::Object(map) => map
            .iter()
            .filter(|(field, _)| field.as_str() != "metadata" && field.as_str() != "status")
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect::<serde_json::Map<_, _>>(),
        _ => serde_json::Map::new(),
    };
    strip(current) != strip(updated)
}

fn not_found(kind: &str, name: &str) -> StoreError {
    StoreError::NotFound {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}
