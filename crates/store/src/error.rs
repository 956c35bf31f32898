use thiserror::Error;

/// Errors surfaced by object store operations.
///
/// Messages follow the wording reconciler authors already see from cluster API
/// servers so test expectations can match them verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: String, name: String },

    #[error(
        "Operation cannot be fulfilled on {kind} \"{name}\": the object has been modified; please apply your changes to the latest version and try again"
    )]
    Conflict { kind: String, name: String },

    #[error("{kind} \"{name}\" is invalid: {reason}")]
    Invalid { kind: String, name: String, reason: String },

    /// The kind was not registered for status tracking, so status writes have nowhere to go.
    #[error("{kind} \"{name}\" has no status subresource")]
    NoStatusSubresource { kind: String, name: String },

    #[error("no kind \"{kind}\" is registered for the scheme")]
    UnregisteredKind { kind: String },

    #[error("invalid label selector: {0}")]
    InvalidSelector(String),

    #[error("{kind} serialization error: {source}")]
    Serialization {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub fn is_no_status_subresource(&self) -> bool {
        matches!(self, StoreError::NoStatusSubresource { .. })
    }
}

/// Maps a not-found error to `Ok(None)`, passing every other outcome through.
pub fn ignore_not_found<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error),
    }
}
