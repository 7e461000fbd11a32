//! Error types for Flagkeeper core
//!
//! Storage contracts report [`StoreError`]; domain services wrap them in
//! [`ToggleError`] together with the domain-specific failure kinds.

use thiserror::Error;

/// Errors raised by store implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested key does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// An entry with the same key is already stored
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// The backing storage failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::AlreadyExists {
            entity,
            key: key.into(),
        }
    }
}

/// Main error type for toggle and health operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToggleError {
    /// A toggle, project or feature type was not found
    #[error("{entity} '{name}' not found")]
    NotFound { entity: &'static str, name: String },

    /// The toggle name is already in use (archived toggles keep their name)
    #[error("A toggle named '{0}' already exists")]
    NameConflict(String),

    /// The toggle name is not URL-friendly
    #[error("Invalid toggle name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A toggle references a type with no configured lifetime entry
    #[error("Unknown feature type '{0}': no lifetime configured")]
    UnknownFeatureType(String),

    /// Failure from the storage layer
    #[error(transparent)]
    Store(StoreError),
}

impl ToggleError {
    pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        ToggleError::NotFound {
            entity,
            name: name.into(),
        }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ToggleError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for ToggleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, key } => ToggleError::NotFound { entity, name: key },
            StoreError::AlreadyExists { entity: "feature toggle", key } => {
                ToggleError::NameConflict(key)
            }
            other => ToggleError::Store(other),
        }
    }
}

/// Result type alias for toggle operations
pub type Result<T> = std::result::Result<T, ToggleError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ToggleError::NameConflict("checkout.v2".to_string());
        assert_eq!(err.to_string(), "A toggle named 'checkout.v2' already exists");

        let err = ToggleError::UnknownFeatureType("rollout".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown feature type 'rollout': no lifetime configured"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: ToggleError = StoreError::not_found("project", "p1").into();
        assert_eq!(err, ToggleError::not_found("project", "p1"));

        let err: ToggleError = StoreError::already_exists("feature toggle", "f1").into();
        assert_eq!(err, ToggleError::NameConflict("f1".to_string()));

        let err: ToggleError = StoreError::already_exists("project", "p1").into();
        assert!(matches!(err, ToggleError::Store(StoreError::AlreadyExists { .. })));
    }
}
