//! Person resolution by identifier and issuing authority.
//!
//! Resolution runs in two phases over the identifier-assignment pattern:
//!
//! 1. **Match**: assignments reached from `Identifier {value = ident}` are
//!    intersected with assignments reached from `Agent {identifier = authority}`.
//!    Each surviving assignment contributes its `assigned_attribute_to` target.
//! 2. **Aggregate**: for each distinct person, every incoming assignment is
//!    read back into an `identifier value -> authority` map.
//!
//! Malformed assignments (missing or repeated edges, missing properties) are
//! logged and skipped. Store faults abort the call.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::ResolverConfig;
use crate::error::{DataIssue, ResolveResult};
use crate::graph::NodeId;
use crate::schema::CrmSchema;
use crate::storage::{GraphStore, ReadTransaction, StorageError};
use crate::value::PropertyValue;

/// A person found for an `(ident, authority)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMatch {
    /// Handle of the person node.
    pub person: NodeId,
    /// Properties of the person node.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Every identifier value known for the person, mapped to its authority.
    pub identifiers: BTreeMap<String, String>,
}

/// Resolves persons from identifiers against a [`GraphStore`].
///
/// The resolver keeps no state between calls and may be shared across
/// threads.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn GraphStore>,
    config: ResolverConfig,
}

impl IdentityResolver {
    /// Create a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Create a resolver with the default CIDOC-CRM schema.
    #[must_use]
    pub fn with_defaults(store: Arc<dyn GraphStore>) -> Self {
        Self::new(store, ResolverConfig::default())
    }

    /// Configuration the resolver was built with.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve persons holding `ident` as assigned by `authority`.
    ///
    /// Opens one read transaction and releases it on every return path.
    /// An empty vector means nothing matched.
    ///
    /// # Errors
    /// `StoreUnavailable` if the store fails. No partial result is returned.
    pub fn resolve_person_by_identifier(
        &self,
        ident: &str,
        authority: &str,
    ) -> ResolveResult<Vec<PersonMatch>> {
        let tx = self.store.begin_read()?;
        self.resolve_in(tx.as_ref(), ident, authority)
    }

    /// Same as [`Self::resolve_person_by_identifier`] inside a caller-managed
    /// transaction.
    ///
    /// # Errors
    /// `StoreUnavailable` if a read fails at the store level.
    #[instrument(skip(self, tx, ident, authority), fields(ident = %ident, authority = %authority))]
    pub fn resolve_in(
        &self,
        tx: &dyn ReadTransaction,
        ident: &str,
        authority: &str,
    ) -> ResolveResult<Vec<PersonMatch>> {
        let schema = &self.config.schema;

        let by_ident = assignments_via(
            tx,
            &schema.identifier_label,
            &schema.identifier_value_key,
            ident,
            &schema.assigned,
        )?;
        if by_ident.is_empty() {
            debug!("no assignment carries the identifier");
            return Ok(Vec::new());
        }

        let by_authority = assignments_via(
            tx,
            &schema.agent_label,
            &schema.agent_identifier_key,
            authority,
            &schema.carried_out_by,
        )?;
        let matched: Vec<NodeId> = by_ident.intersection(&by_authority).copied().collect();
        debug!(
            by_ident = by_ident.len(),
            by_authority = by_authority.len(),
            matched = matched.len(),
            "candidate assignments"
        );

        let mut persons = BTreeSet::new();
        for assignment in matched {
            if let Some(person) = self.match_target(tx, assignment)? {
                persons.insert(person);
            }
        }
        if persons.len() > 1 {
            warn!(
                persons = persons.len(),
                "identifier pair is assigned to more than one person"
            );
        }

        persons
            .into_iter()
            .map(|person| self.person_match(tx, person))
            .collect()
    }

    /// Target person of a matched assignment, if the assignment is well formed.
    fn match_target(
        &self,
        tx: &dyn ReadTransaction,
        assignment: NodeId,
    ) -> ResolveResult<Option<NodeId>> {
        let schema = &self.config.schema;

        if self.config.enforce_labels
            && !require_label(tx, assignment, &schema.assignment_label)?
        {
            return Ok(None);
        }
        // Reached through both edges, so only repeated edges can fail here.
        for rel_type in [&schema.assigned, &schema.carried_out_by] {
            if follow(tx, assignment, rel_type)?.is_none() {
                return Ok(None);
            }
        }
        let Some(person) = follow(tx, assignment, &schema.assigned_attribute_to)? else {
            return Ok(None);
        };
        if self.config.enforce_labels && !require_label(tx, person, &schema.person_label)? {
            return Ok(None);
        }
        Ok(Some(person))
    }

    fn person_match(&self, tx: &dyn ReadTransaction, person: NodeId) -> ResolveResult<PersonMatch> {
        let schema = &self.config.schema;

        let properties = match tx.node_properties(person) {
            Ok(properties) => properties,
            Err(err) if err.is_data_fault() => {
                warn!(%person, error = %err, "person properties unreadable");
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };

        let assignments = match tx.incoming_edges(person, &schema.assigned_attribute_to) {
            Ok(assignments) => assignments,
            Err(err) => {
                skip_or_abort(err, &schema.assigned_attribute_to)?;
                Vec::new()
            }
        };

        let mut identifiers = BTreeMap::new();
        for assignment in assignments {
            if let Some((value, authority)) = identifier_entry(tx, schema, assignment)? {
                // Duplicate values: last assignment in iteration order wins.
                identifiers.insert(value, authority);
            }
        }

        Ok(PersonMatch {
            person,
            properties,
            identifiers,
        })
    }
}

/// Assignments reached from nodes `label {key = value}` over incoming `rel_type`.
fn assignments_via(
    tx: &dyn ReadTransaction,
    label: &str,
    key: &str,
    value: &str,
    rel_type: &str,
) -> ResolveResult<BTreeSet<NodeId>> {
    let mut assignments = BTreeSet::new();
    for node in tx.find_by_label_and_property(label, key, &PropertyValue::from(value))? {
        match tx.incoming_edges(node, rel_type) {
            Ok(sources) => assignments.extend(sources),
            Err(err) => skip_or_abort(err, rel_type)?,
        }
    }
    Ok(assignments)
}

/// One `(identifier value, authority)` entry for an assignment.
fn identifier_entry(
    tx: &dyn ReadTransaction,
    schema: &CrmSchema,
    assignment: NodeId,
) -> ResolveResult<Option<(String, String)>> {
    let Some(identifier) = follow(tx, assignment, &schema.assigned)? else {
        return Ok(None);
    };
    let Some(agent) = follow(tx, assignment, &schema.carried_out_by)? else {
        return Ok(None);
    };
    let Some(value) = rendered_property(tx, identifier, &schema.identifier_value_key)? else {
        return Ok(None);
    };
    let Some(authority) = rendered_property(tx, agent, &schema.agent_identifier_key)? else {
        return Ok(None);
    };
    Ok(Some((value, authority)))
}

/// Follow a single-cardinality edge, turning schema violations into `None`.
fn follow(tx: &dyn ReadTransaction, node: NodeId, rel_type: &str) -> ResolveResult<Option<NodeId>> {
    match tx.outgoing_edge(node, rel_type) {
        Ok(Some(target)) => Ok(Some(target)),
        Ok(None) => {
            report(&DataIssue::SchemaViolation {
                node,
                rel_type: rel_type.to_string(),
                reason: "missing outgoing relationship".to_string(),
            });
            Ok(None)
        }
        Err(err) => {
            skip_or_abort(err, rel_type)?;
            Ok(None)
        }
    }
}

fn rendered_property(
    tx: &dyn ReadTransaction,
    node: NodeId,
    key: &str,
) -> ResolveResult<Option<String>> {
    let rendered = match tx.get_property(node, key) {
        Ok(value) => value.render(),
        Err(err) => {
            skip_or_abort(err, key)?;
            return Ok(None);
        }
    };
    if rendered.is_none() {
        report(&DataIssue::PropertyMissing {
            node,
            key: key.to_string(),
        });
    }
    Ok(rendered)
}

fn require_label(tx: &dyn ReadTransaction, node: NodeId, label: &str) -> ResolveResult<bool> {
    match tx.has_label(node, label) {
        Ok(true) => Ok(true),
        Ok(false) => {
            report(&DataIssue::LabelMismatch {
                node,
                label: label.to_string(),
            });
            Ok(false)
        }
        Err(err) => {
            skip_or_abort(err, label)?;
            Ok(false)
        }
    }
}

/// Log a data fault and continue, or propagate a store fault.
fn skip_or_abort(err: StorageError, context: &str) -> ResolveResult<()> {
    match DataIssue::from_storage(&err, context) {
        Some(issue) => {
            report(&issue);
            Ok(())
        }
        None => Err(err.into()),
    }
}

fn report(issue: &DataIssue) {
    warn!(%issue, "skipping malformed graph data");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryGraph;

    const IDENT: &str = "crm_E42_Identifier";
    const AGENT: &str = "crm_E39_Actor";
    const PERSON: &str = "crm_E21_Person";
    const EVENT: &str = "crm_E15_Identifier_Assignment";
    const ASSIGNED: &str = "crm_P37_assigned";
    const BY: &str = "crm_P14_carried_out_by";
    const TO: &str = "crm_P140_assigned_attribute_to";

    fn assign(graph: &InMemoryGraph, ident: NodeId, agent: NodeId, person: NodeId) -> NodeId {
        let ev = graph.create_node(&[EVENT], &[]).unwrap();
        graph.create_relationship(ev, ASSIGNED, ident).unwrap();
        graph.create_relationship(ev, BY, agent).unwrap();
        graph.create_relationship(ev, TO, person).unwrap();
        ev
    }

    fn identifier(graph: &InMemoryGraph, value: &str) -> NodeId {
        graph.create_node(&[IDENT], &[("value", PropertyValue::from(value))]).unwrap()
    }

    fn agent(graph: &InMemoryGraph, code: &str) -> NodeId {
        graph.create_node(&[AGENT], &[("identifier", PropertyValue::from(code))]).unwrap()
    }

    #[test]
    fn test_identifier_and_authority_are_intersected() {
        let graph = Arc::new(InMemoryGraph::new());
        let x = identifier(&graph, "X1");
        let loc = agent(&graph, "LOC");
        let viaf = agent(&graph, "VIAF");
        let p1 = graph.create_node(&[PERSON], &[]).unwrap();
        let p2 = graph.create_node(&[PERSON], &[]).unwrap();
        // Same literal issued by two authorities to two people.
        assign(&graph, x, loc, p1);
        assign(&graph, x, viaf, p2);

        let resolver = IdentityResolver::with_defaults(graph.clone());
        let found = resolver.resolve_person_by_identifier("X1", "VIAF").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].person, p2);
    }

    #[test]
    fn test_repeated_assigned_edge_excludes_assignment() {
        let graph = Arc::new(InMemoryGraph::new());
        let x = identifier(&graph, "X1");
        let y = identifier(&graph, "Y1");
        let loc = agent(&graph, "LOC");
        let p1 = graph.create_node(&[PERSON], &[]).unwrap();
        let ev = assign(&graph, x, loc, p1);
        graph.create_relationship(ev, ASSIGNED, y).unwrap();

        let resolver = IdentityResolver::with_defaults(graph.clone());
        assert!(resolver.resolve_person_by_identifier("X1", "LOC").unwrap().is_empty());
    }

    #[test]
    fn test_enforce_labels_skips_unlabelled_person() {
        let graph = Arc::new(InMemoryGraph::new());
        let x = identifier(&graph, "X1");
        let loc = agent(&graph, "LOC");
        let not_a_person = graph.create_node(&["crm_E53_Place"], &[]).unwrap();
        assign(&graph, x, loc, not_a_person);

        let lenient = IdentityResolver::with_defaults(graph.clone());
        assert_eq!(lenient.resolve_person_by_identifier("X1", "LOC").unwrap().len(), 1);

        let config = ResolverConfig {
            enforce_labels: true,
            ..ResolverConfig::default()
        };
        let strict = IdentityResolver::new(graph.clone(), config);
        assert!(strict.resolve_person_by_identifier("X1", "LOC").unwrap().is_empty());
    }

    #[test]
    fn test_enforce_labels_skips_unlabelled_assignment() {
        let graph = Arc::new(InMemoryGraph::new());
        let x = identifier(&graph, "X1");
        let loc = agent(&graph, "LOC");
        let p1 = graph.create_node(&[PERSON], &[]).unwrap();
        let ev = graph.create_node(&[], &[]).unwrap();
        graph.create_relationship(ev, ASSIGNED, x).unwrap();
        graph.create_relationship(ev, BY, loc).unwrap();
        graph.create_relationship(ev, TO, p1).unwrap();

        let lenient = IdentityResolver::with_defaults(graph.clone());
        let found = lenient.resolve_person_by_identifier("X1", "LOC").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].person, p1);

        let config = ResolverConfig {
            enforce_labels: true,
            ..ResolverConfig::default()
        };
        let strict = IdentityResolver::new(graph.clone(), config);
        assert!(strict.resolve_person_by_identifier("X1", "LOC").unwrap().is_empty());
        assert_eq!(graph.open_read_transactions(), 0);
    }

    #[test]
    fn test_non_string_identifier_value_is_rendered() {
        let graph = Arc::new(InMemoryGraph::new());
        let x = identifier(&graph, "X1");
        let numeric = graph.create_node(&[IDENT], &[("value", PropertyValue::Int(42))]).unwrap();
        let loc = agent(&graph, "LOC");
        let p1 = graph.create_node(&[PERSON], &[]).unwrap();
        assign(&graph, x, loc, p1);
        assign(&graph, numeric, loc, p1);

        let resolver = IdentityResolver::with_defaults(graph.clone());
        let found = resolver.resolve_person_by_identifier("X1", "LOC").unwrap();
        assert_eq!(found[0].identifiers.get("42").map(String::as_str), Some("LOC"));
    }

    #[test]
    fn test_person_match_serializes() {
        let m = PersonMatch {
            person: NodeId::from_key("p1"),
            properties: BTreeMap::new(),
            identifiers: BTreeMap::from([("X123".to_string(), "LOC".to_string())]),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["identifiers"]["X123"], "LOC");
    }
}
