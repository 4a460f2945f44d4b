//! In-memory graph backend.
//!
//! Thread-safe property graph intended for embedded usage, tests, and as a
//! reference implementation of the storage traits. A read transaction holds
//! the read lock for its whole lifetime, so it sees a stable snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

use crate::graph::{GraphSnapshot, NodeId, NodeRecord, Relationship};
use crate::storage::traits::{GraphStore, ReadTransaction, StorageError};
use crate::value::PropertyValue;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

type Adjacency = HashMap<NodeId, HashMap<String, Vec<NodeId>>>;

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<NodeId, NodeRecord>,
    by_label: HashMap<String, BTreeSet<NodeId>>,
    outgoing: Adjacency,
    incoming: Adjacency,
    relationships: usize,
}

impl GraphState {
    fn node(&self, id: NodeId) -> Result<&NodeRecord, StorageError> {
        self.nodes.get(&id).ok_or(StorageError::NodeNotFound(id))
    }

    fn neighbours<'s>(adjacency: &'s Adjacency, node: NodeId, rel_type: &str) -> &'s [NodeId] {
        adjacency
            .get(&node)
            .and_then(|by_type| by_type.get(rel_type))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn insert_node(&mut self, record: NodeRecord) -> Result<(), StorageError> {
        if self.nodes.contains_key(&record.id) {
            return Err(StorageError::DuplicateKey(record.id.to_string()));
        }
        for label in &record.labels {
            self.by_label.entry(label.clone()).or_default().insert(record.id);
        }
        self.nodes.insert(record.id, record);
        Ok(())
    }

    fn insert_relationship(&mut self, rel: Relationship) -> Result<(), StorageError> {
        self.node(rel.start)?;
        self.node(rel.end)?;
        self.outgoing
            .entry(rel.start)
            .or_default()
            .entry(rel.rel_type.clone())
            .or_default()
            .push(rel.end);
        self.incoming
            .entry(rel.end)
            .or_default()
            .entry(rel.rel_type)
            .or_default()
            .push(rel.start);
        self.relationships += 1;
        Ok(())
    }
}

/// Thread-safe in-memory property graph.
///
/// A read transaction holds the graph's read lock until it is dropped.
#[derive(Debug)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
    available: AtomicBool,
    open_reads: AtomicUsize,
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
            available: AtomicBool::new(true),
            open_reads: AtomicUsize::new(0),
        }
    }
}

impl InMemoryGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a snapshot, deriving node IDs from snapshot keys.
    ///
    /// # Errors
    /// - `DuplicateKey`: if two nodes share a key
    /// - `SerializationError`: if a relationship names an unknown key
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, StorageError> {
        let graph = Self::new();
        {
            let mut state = graph.state.write().map_err(|_| lock_err("graph.from_snapshot"))?;
            for node in &snapshot.nodes {
                state.insert_node(NodeRecord {
                    id: NodeId::from_key(&node.key),
                    labels: node.labels.iter().cloned().collect(),
                    properties: node.properties.clone(),
                })?;
            }
            let keys: HashSet<&str> = snapshot.nodes.iter().map(|n| n.key.as_str()).collect();
            for rel in &snapshot.relationships {
                for key in [&rel.start, &rel.end] {
                    if !keys.contains(key.as_str()) {
                        return Err(StorageError::SerializationError(format!(
                            "relationship '{}' references unknown node key '{key}'",
                            rel.rel_type
                        )));
                    }
                }
                state.insert_relationship(Relationship {
                    start: NodeId::from_key(&rel.start),
                    rel_type: rel.rel_type.clone(),
                    end: NodeId::from_key(&rel.end),
                })?;
            }
        }
        Ok(graph)
    }

    /// Build a graph from a JSON snapshot document.
    ///
    /// # Errors
    /// `SerializationError` for malformed JSON, otherwise as [`Self::from_snapshot`].
    pub fn from_json_str(json: &str) -> Result<Self, StorageError> {
        let snapshot: GraphSnapshot =
            serde_json::from_str(json).map_err(|e| StorageError::SerializationError(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Build a graph from a JSON snapshot file.
    ///
    /// # Errors
    /// `BackendError` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StorageError::BackendError(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Insert a node with a fresh random ID.
    ///
    /// # Errors
    /// Fails only if the lock is poisoned.
    ///
    /// # Deadlocks
    /// Blocks forever if the calling thread still holds a read transaction
    /// from this graph. Drop it first.
    pub fn create_node(
        &self,
        labels: &[&str],
        properties: &[(&str, PropertyValue)],
    ) -> Result<NodeId, StorageError> {
        let id = NodeId::new();
        self.create_node_with_id(id, labels, properties)?;
        Ok(id)
    }

    /// Insert a node under a caller-chosen ID.
    ///
    /// # Errors
    /// `DuplicateKey` if the ID is already taken.
    ///
    /// # Deadlocks
    /// Blocks forever if the calling thread still holds a read transaction
    /// from this graph. Drop it first.
    pub fn create_node_with_id(
        &self,
        id: NodeId,
        labels: &[&str],
        properties: &[(&str, PropertyValue)],
    ) -> Result<(), StorageError> {
        let record = NodeRecord {
            id,
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            properties: properties
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        };
        let mut state = self.state.write().map_err(|_| lock_err("graph.create_node"))?;
        state.insert_node(record)
    }

    /// Insert a directed relationship. Parallel relationships are allowed.
    ///
    /// # Errors
    /// `NodeNotFound` if either endpoint is missing.
    ///
    /// # Deadlocks
    /// Blocks forever if the calling thread still holds a read transaction
    /// from this graph. Drop it first.
    pub fn create_relationship(
        &self,
        start: NodeId,
        rel_type: &str,
        end: NodeId,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("graph.create_relationship"))?;
        state.insert_relationship(Relationship {
            start,
            rel_type: rel_type.to_string(),
            end,
        })
    }

    /// Number of stored nodes.
    ///
    /// # Errors
    /// Fails only if the lock is poisoned.
    pub fn node_count(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.node_count"))?;
        Ok(state.nodes.len())
    }

    /// Number of stored relationships.
    ///
    /// # Errors
    /// Fails only if the lock is poisoned.
    pub fn relationship_count(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.relationship_count"))?;
        Ok(state.relationships)
    }

    /// Mark the store reachable or unreachable.
    ///
    /// While unreachable, opening a transaction and every read inside an
    /// already-open transaction fail with `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of read transactions currently open.
    #[must_use]
    pub fn open_read_transactions(&self) -> usize {
        self.open_reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("in-memory graph marked unavailable".to_string()))
        }
    }
}

impl GraphStore for InMemoryGraph {
    /// Open a read transaction holding the graph's read lock until dropped.
    ///
    /// # Deadlocks
    /// Writers block while any transaction is open, so a thread must not call
    /// [`InMemoryGraph::create_node`] or [`InMemoryGraph::create_relationship`]
    /// while holding one. A second `begin_read` on a thread that already holds
    /// a transaction can block behind a waiting writer.
    fn begin_read(&self) -> Result<Box<dyn ReadTransaction + '_>, StorageError> {
        self.check_available()?;
        let state = self.state.read().map_err(|_| lock_err("graph.begin_read"))?;
        self.open_reads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryReadTransaction { graph: self, state }))
    }
}

struct InMemoryReadTransaction<'a> {
    graph: &'a InMemoryGraph,
    state: RwLockReadGuard<'a, GraphState>,
}

impl Drop for InMemoryReadTransaction<'_> {
    fn drop(&mut self) {
        self.graph.open_reads.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ReadTransaction for InMemoryReadTransaction<'_> {
    fn find_by_label_and_property(
        &self,
        label: &str,
        key: &str,
        value: &PropertyValue,
    ) -> Result<Vec<NodeId>, StorageError> {
        self.graph.check_available()?;
        let Some(ids) = self.state.by_label.get(label) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter(|id| {
                self.state
                    .nodes
                    .get(*id)
                    .and_then(|n| n.properties.get(key))
                    .is_some_and(|v| v == value)
            })
            .copied()
            .collect())
    }

    fn outgoing_edge(&self, node: NodeId, rel_type: &str) -> Result<Option<NodeId>, StorageError> {
        self.graph.check_available()?;
        self.state.node(node)?;
        match GraphState::neighbours(&self.state.outgoing, node, rel_type) {
            [] => Ok(None),
            [end] => Ok(Some(*end)),
            many => Err(StorageError::MultipleRelationships {
                node,
                rel_type: rel_type.to_string(),
                count: many.len(),
            }),
        }
    }

    fn incoming_edges(&self, node: NodeId, rel_type: &str) -> Result<Vec<NodeId>, StorageError> {
        self.graph.check_available()?;
        self.state.node(node)?;
        let mut seen = HashSet::new();
        Ok(GraphState::neighbours(&self.state.incoming, node, rel_type)
            .iter()
            .filter(|start| seen.insert(**start))
            .copied()
            .collect())
    }

    fn get_property(&self, node: NodeId, key: &str) -> Result<PropertyValue, StorageError> {
        self.graph.check_available()?;
        self.state
            .node(node)?
            .properties
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::PropertyMissing {
                node,
                key: key.to_string(),
            })
    }

    fn has_label(&self, node: NodeId, label: &str) -> Result<bool, StorageError> {
        self.graph.check_available()?;
        Ok(self.state.node(node)?.has_label(label))
    }

    fn node_properties(&self, node: NodeId) -> Result<BTreeMap<String, PropertyValue>, StorageError> {
        self.graph.check_available()?;
        Ok(self.state.node(node)?.properties.clone())
    }
}
