//! Error types for modux-store operations.

use crate::Namespace;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type returned by action handlers.
pub type ActionResult = Result<serde_json::Value, ActionError>;

/// Errors raised while building or driving a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A getter, mutation or action slot does not hold a callable handler.
    #[error("{kind} {name} should be a handler, found {found}")]
    InvalidHandlerKind {
        /// Which table the slot belongs to (`getter`, `mutation`, `action`).
        kind: HandlerKind,
        /// Qualified name of the slot.
        name: String,
        /// JSON type of the value found in the slot.
        found: &'static str,
    },

    /// A module declared a state value that is not a record.
    #[error("state of module at {path} should be an object, found {found}")]
    InvalidState {
        /// Namespace the state would be merged into.
        path: Namespace,
        /// JSON type of the declared state.
        found: &'static str,
    },

    /// Strict mode: two modules wrote the same key at one state level.
    #[error("state key {key} already exists at {path}")]
    StateKeyCollision {
        /// Namespace level where the collision happened.
        path: Namespace,
        /// Colliding key.
        key: String,
    },

    /// A mutation's state record was replaced by a non-record value.
    #[error("state record at {path} is no longer an object")]
    DetachedState {
        /// Namespace of the detached record.
        path: Namespace,
    },

    /// A module manifest could not be parsed.
    #[error("invalid module manifest: {message}")]
    ManifestParse {
        /// Description of what went wrong.
        message: String,
    },

    /// Store options could not be loaded.
    #[error("invalid store configuration: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an invalid handler kind error.
    #[inline]
    pub fn invalid_handler(kind: HandlerKind, name: impl Into<String>, found: &'static str) -> Self {
        StoreError::InvalidHandlerKind {
            kind,
            name: name.into(),
            found,
        }
    }

    /// Create an invalid state error.
    #[inline]
    pub fn invalid_state(path: Namespace, found: &'static str) -> Self {
        StoreError::InvalidState { path, found }
    }

    /// Create a state key collision error.
    #[inline]
    pub fn key_collision(path: Namespace, key: impl Into<String>) -> Self {
        StoreError::StateKeyCollision {
            path,
            key: key.into(),
        }
    }

    /// Create a detached state error.
    #[inline]
    pub fn detached(path: Namespace) -> Self {
        StoreError::DetachedState { path }
    }

    /// Create a manifest parse error.
    #[inline]
    pub fn manifest(message: impl Into<String>) -> Self {
        StoreError::ManifestParse {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        StoreError::Config {
            message: message.into(),
        }
    }

    /// Whether this error aborts store construction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidHandlerKind { .. }
                | StoreError::InvalidState { .. }
                | StoreError::StateKeyCollision { .. }
                | StoreError::ManifestParse { .. }
        )
    }
}

/// Errors produced by action handlers.
///
/// The future returned by `Store::dispatch` resolves to exactly the error the
/// handler produced.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action failed for a domain reason.
    #[error("action failed: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },

    /// A store operation issued from inside the action failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ActionError {
    /// Create a failed action error.
    #[inline]
    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed {
            message: message.into(),
        }
    }
}

/// The three handler tables of a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Getter,
    Mutation,
    Action,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Getter => "getter",
            HandlerKind::Mutation => "mutation",
            HandlerKind::Action => "action",
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace;

    #[test]
    fn test_error_display() {
        let err = StoreError::invalid_handler(HandlerKind::Getter, "cart/total", "number");
        assert_eq!(
            err.to_string(),
            "getter cart/total should be a handler, found number"
        );

        let err = StoreError::key_collision(namespace!("cart"), "items");
        assert!(err.to_string().contains("already exists at cart"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(StoreError::invalid_handler(HandlerKind::Action, "a", "string").is_configuration());
        assert!(!StoreError::detached(Namespace::root()).is_configuration());
    }

    #[test]
    fn test_action_error_wraps_store_error() {
        let err: ActionError = StoreError::detached(namespace!("m")).into();
        assert!(matches!(err, ActionError::Store(StoreError::DetachedState { .. })));
    }

    #[test]
    fn test_value_type_name() {
        use serde_json::json;

        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(true)), "boolean");
        assert_eq!(value_type_name(&json!(42)), "number");
        assert_eq!(value_type_name(&json!("hello")), "string");
        assert_eq!(value_type_name(&json!([1, 2, 3])), "array");
        assert_eq!(value_type_name(&json!({"a": 1})), "object");
    }
}
