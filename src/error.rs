//! Error types for crm-ident.
//!
//! Errors are strongly typed using thiserror. Store-level faults abort a
//! resolution; data-level irregularities are described by [`DataIssue`],
//! logged, and skipped so they degrade the result rather than the call.

use thiserror::Error;

use crate::graph::NodeId;
use crate::storage::StorageError;

/// Validation errors raised before any graph access happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required parameter '{name}' is missing")]
    MissingParameter {
        name: String,
    },

    #[error("Parameter '{name}' is invalid: {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    #[error("Unknown procedure '{name}'")]
    UnknownProcedure {
        name: String,
    },

    #[error("Schema name '{field}' cannot be empty")]
    EmptySchemaName {
        field: &'static str,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Execution errors that abort a resolution call.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Graph store unavailable: {message}")]
    StoreUnavailable {
        message: String,
    },
}

/// A data-integrity irregularity met while traversing the graph.
///
/// Issues are never returned to the caller. The resolver logs them and skips
/// the offending assignment or entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataIssue {
    #[error("node {node} violates the schema on '{rel_type}': {reason}")]
    SchemaViolation {
        node: NodeId,
        rel_type: String,
        reason: String,
    },

    #[error("node {node} has no usable property '{key}'")]
    PropertyMissing {
        node: NodeId,
        key: String,
    },

    #[error("node {node} does not carry label '{label}'")]
    LabelMismatch {
        node: NodeId,
        label: String,
    },
}

impl DataIssue {
    /// Converts a data-level storage fault into an issue.
    ///
    /// Returns `None` when the error is a store-level fault that must abort
    /// the call instead.
    #[must_use]
    pub fn from_storage(err: &StorageError, rel_type: &str) -> Option<Self> {
        match err {
            StorageError::PropertyMissing { node, key } => Some(Self::PropertyMissing {
                node: *node,
                key: key.clone(),
            }),
            StorageError::MultipleRelationships { node, count, .. } => Some(Self::SchemaViolation {
                node: *node,
                rel_type: rel_type.to_string(),
                reason: format!("{count} outgoing relationships, expected exactly one"),
            }),
            StorageError::NodeNotFound(node) => Some(Self::SchemaViolation {
                node: *node,
                rel_type: rel_type.to_string(),
                reason: "node vanished during traversal".to_string(),
            }),
            _ => None,
        }
    }
}

/// Top-level error type for crm-ident.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl From<StorageError> for ResolveError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(_) | StorageError::BackendError(_) => {
                Self::Execution(ExecutionError::StoreUnavailable {
                    message: err.to_string(),
                })
            }
            other => Self::internal(format!("unexpected storage error: {other}")),
        }
    }
}

impl ResolveError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if the store could not serve the call.
    #[must_use]
    pub const fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::StoreUnavailable { .. }))
    }

    /// Returns true if this error is worth retrying by the caller.
    ///
    /// The resolver itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.is_store_unavailable()
    }
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
