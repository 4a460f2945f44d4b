//! Node handles and graph records.
//!
//! The resolver never owns graph data. These types describe what a store
//! hands back and what a snapshot file contains.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::PropertyValue;

/// Namespace used to derive stable node IDs from snapshot keys.
const NODE_KEY_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b7e_9a43_4d58_b1e2_0c8d_5f3a_7e91);

/// Opaque handle to a node in the graph store.
///
/// # Examples
///
/// ```
/// use crm_ident::NodeId;
///
/// assert_eq!(NodeId::from_key("p1"), NodeId::from_key("p1"));
/// assert_ne!(NodeId::new(), NodeId::new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Creates a new random node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derives a stable node ID from a human-readable key.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self(Uuid::new_v5(&NODE_KEY_NAMESPACE, key.as_bytes()))
    }

    /// Creates a node ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A stored node: labels plus properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identity.
    pub id: NodeId,
    /// Labels carried by the node.
    pub labels: BTreeSet<String>,
    /// Property map.
    pub properties: BTreeMap<String, PropertyValue>,
}

impl NodeRecord {
    /// Returns true if the node carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// A directed, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source node.
    pub start: NodeId,
    /// Relationship type.
    pub rel_type: String,
    /// Target node.
    pub end: NodeId,
}

/// Node entry of a [`GraphSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Snapshot-local key, turned into a [`NodeId`] with [`NodeId::from_key`].
    pub key: String,
    /// Node labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Node properties.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Relationship entry of a [`GraphSnapshot`], referring to nodes by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSpec {
    /// Key of the source node.
    pub start: String,
    /// Relationship type, serialized as `type`.
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Key of the target node.
    pub end: String,
}

/// Serialized graph content used to seed a store.
///
/// ```json
/// {
///   "nodes": [{ "key": "i1", "labels": ["crm_E42_Identifier"], "properties": { "value": "X123" } }],
///   "relationships": [{ "start": "a1", "type": "crm_P37_assigned", "end": "i1" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes, keyed by snapshot-local key.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Relationships between snapshot keys.
    #[serde(default)]
    pub relationships: Vec<RelationshipSpec>,
}
