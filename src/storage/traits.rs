//! Abstract graph storage traits.
//!
//! The resolver reads through these traits only. A backend provides:
//! - exact-match node lookup by label and property
//! - single-cardinality outgoing traversal
//! - incoming traversal
//! - property reads
//!
//! All reads happen inside a [`ReadTransaction`] obtained from a
//! [`GraphStore`]. Dropping the transaction releases it.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::graph::NodeId;
use crate::value::PropertyValue;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store cannot execute the request (connection or transaction failure).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Node not found.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Property absent on a node.
    #[error("Node {node} has no property '{key}'")]
    PropertyMissing {
        /// Node that was read.
        node: NodeId,
        /// Missing key.
        key: String,
    },

    /// A single-cardinality relationship occurs more than once.
    #[error("Node {node} has {count} outgoing '{rel_type}' relationships")]
    MultipleRelationships {
        /// Start node.
        node: NodeId,
        /// Relationship type.
        rel_type: String,
        /// Number of relationships found.
        count: usize,
    },

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StorageError {
    /// Returns true for irregularities in the data rather than in the store.
    ///
    /// Data faults are recoverable per assignment. Everything else aborts a
    /// resolution.
    #[must_use]
    pub const fn is_data_fault(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound(_) | Self::PropertyMissing { .. } | Self::MultipleRelationships { .. }
        )
    }
}

/// Read-only view over the graph, scoped to one transaction.
pub trait ReadTransaction {
    /// Find nodes with `label` whose property `key` equals `value` exactly.
    ///
    /// Returns an empty vector when nothing matches.
    fn find_by_label_and_property(
        &self,
        label: &str,
        key: &str,
        value: &PropertyValue,
    ) -> Result<Vec<NodeId>, StorageError>;

    /// Follow the single outgoing `rel_type` relationship of `node`.
    ///
    /// # Errors
    /// - `NodeNotFound`: if `node` does not exist
    /// - `MultipleRelationships`: if more than one such relationship exists
    fn outgoing_edge(&self, node: NodeId, rel_type: &str) -> Result<Option<NodeId>, StorageError>;

    /// Distinct start nodes of all incoming `rel_type` relationships of `node`.
    fn incoming_edges(&self, node: NodeId, rel_type: &str) -> Result<Vec<NodeId>, StorageError>;

    /// Read one property.
    ///
    /// # Errors
    /// `PropertyMissing` if the node does not carry `key`.
    fn get_property(&self, node: NodeId, key: &str) -> Result<PropertyValue, StorageError>;

    /// Whether `node` carries `label`.
    fn has_label(&self, node: NodeId, label: &str) -> Result<bool, StorageError>;

    /// All properties of `node`.
    fn node_properties(&self, node: NodeId) -> Result<BTreeMap<String, PropertyValue>, StorageError>;
}

/// A graph store able to open read transactions.
///
/// Implementations must allow concurrent read transactions and provide
/// whatever read isolation they advertise; callers add no locking.
pub trait GraphStore: Send + Sync {
    /// Open a read-only transaction. It is released when dropped.
    fn begin_read(&self) -> Result<Box<dyn ReadTransaction + '_>, StorageError>;
}
