use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{NamespacedKey, ObjectMeta};

/// Typed contract implemented by every record kind held in a store.
///
/// Records are persisted as JSON values, so a kind only needs serde support,
/// a `Default` (the "unpopulated" record handed to predicates when the target
/// is missing) and access to its [`ObjectMeta`].
pub trait Resource: Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static {
    /// Kind name used for schema registration and store lookups.
    const KIND: &'static str;

    /// Whether the kind carries a `status` sub-field updated through the status subresource.
    const HAS_STATUS: bool = false;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn key(&self) -> NamespacedKey {
        self.metadata().key()
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    /// Type-erases the record so it can be mixed with other kinds in setup lists.
    fn boxed(self) -> Box<dyn Object>
    where
        Self: Sized,
    {
        Box::new(self)
    }
}

/// Object-safe view over a record of any kind.
pub trait Object: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    fn meta(&self) -> &ObjectMeta;

    fn has_status(&self) -> bool;

    /// Serialized form stored by the object store.
    fn to_value(&self) -> serde_json::Result<Value>;
}

impl<T: Resource> Object for T {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn meta(&self) -> &ObjectMeta {
        self.metadata()
    }

    fn has_status(&self) -> bool {
        T::HAS_STATUS
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{ConfigMap, Node};

    use super::*;

    #[test]
    fn boxed_records_keep_kind_and_status_flag() {
        let objects: Vec<Box<dyn Object>> = vec![
            ConfigMap::new("cm0", "cm").boxed(),
            Node::new("node-0").boxed(),
        ];
        let kinds: Vec<_> = objects.iter().map(|object| (object.kind(), object.has_status())).collect();
        assert_eq!(kinds, vec![("ConfigMap", false), ("Node", true)]);
        assert_eq!(objects[0].meta().key(), NamespacedKey::new("cm0", "cm"));
    }
}
