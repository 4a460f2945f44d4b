use std::sync::Arc;

use crm_ident::{
    IdentityResolver, InMemoryGraph, NodeId, PersonMatch, Procedure, ProcedureCall,
    ResolveError, ResolverConfig, ValidationError, DEFAULT_PROCEDURE_NAME,
};

const SNAPSHOT: &str = r#"{
    "nodes": [
        { "key": "x123", "labels": ["crm_E42_Identifier"], "properties": { "value": "X123" } },
        { "key": "q42", "labels": ["crm_E42_Identifier"], "properties": { "value": "Q42" } },
        { "key": "loc", "labels": ["crm_E39_Actor"], "properties": { "identifier": "LOC" } },
        { "key": "wd", "labels": ["crm_E39_Actor"], "properties": { "identifier": "WIKIDATA" } },
        { "key": "p1", "labels": ["crm_E21_Person"], "properties": { "name": "Douglas Adams" } },
        { "key": "ev1", "labels": ["crm_E15_Identifier_Assignment"] },
        { "key": "ev2", "labels": ["crm_E15_Identifier_Assignment"] }
    ],
    "relationships": [
        { "start": "ev1", "type": "crm_P37_assigned", "end": "x123" },
        { "start": "ev1", "type": "crm_P14_carried_out_by", "end": "loc" },
        { "start": "ev1", "type": "crm_P140_assigned_attribute_to", "end": "p1" },
        { "start": "ev2", "type": "crm_P37_assigned", "end": "q42" },
        { "start": "ev2", "type": "crm_P14_carried_out_by", "end": "wd" },
        { "start": "ev2", "type": "crm_P140_assigned_attribute_to", "end": "p1" }
    ]
}"#;

fn procedure(config: ResolverConfig) -> Procedure {
    let graph = Arc::new(InMemoryGraph::from_json_str(SNAPSHOT).unwrap());
    Procedure::new(IdentityResolver::new(graph, config))
}

#[test]
fn call_by_default_name() {
    let dispatcher = procedure(ResolverConfig::default());
    assert_eq!(dispatcher.name(), DEFAULT_PROCEDURE_NAME);

    let found = dispatcher
        .call(&ProcedureCall::resolve(DEFAULT_PROCEDURE_NAME, "Q42", "WIKIDATA"))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].person, NodeId::from_key("p1"));
    assert_eq!(found[0].identifiers.len(), 2);
    assert_eq!(found[0].identifiers["X123"], "LOC");
    assert_eq!(found[0].identifiers["Q42"], "WIKIDATA");
}

#[test]
fn unknown_procedure_rejected() {
    let dispatcher = procedure(ResolverConfig::default());
    let err = dispatcher
        .call(&ProcedureCall::resolve("eu.r11.somethingElse", "Q42", "WIKIDATA"))
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Validation(ValidationError::UnknownProcedure { .. })
    ));
}

#[test]
fn configured_name_is_honoured() {
    let config = ResolverConfig::from_json_str(r#"{ "procedure_name": "crm.person" }"#).unwrap();
    let dispatcher = procedure(config);
    assert!(dispatcher.call(&ProcedureCall::resolve("crm.person", "X123", "LOC")).is_ok());
    assert!(dispatcher
        .call(&ProcedureCall::resolve(DEFAULT_PROCEDURE_NAME, "X123", "LOC"))
        .is_err());
}

#[test]
fn missing_authority_rejected() {
    let dispatcher = procedure(ResolverConfig::default());
    let request = format!(r#"{{ "name": "{DEFAULT_PROCEDURE_NAME}", "params": {{ "ident": "X123" }} }}"#);
    let err = dispatcher.call_json(&request).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Validation(ValidationError::MissingParameter { ref name }) if name == "authority"
    ));
}

#[test]
fn call_json_round_trip() {
    let dispatcher = procedure(ResolverConfig::default());
    let request = format!(
        r#"{{ "name": "{DEFAULT_PROCEDURE_NAME}", "params": {{ "ident": "X123", "authority": "LOC" }} }}"#
    );
    let response = dispatcher.call_json(&request).unwrap();
    let records: Vec<PersonMatch> = serde_json::from_str(&response).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].properties["name"].as_str(), Some("Douglas Adams"));

    let none = dispatcher
        .call_json(&format!(
            r#"{{ "name": "{DEFAULT_PROCEDURE_NAME}", "params": {{ "ident": "X123", "authority": "WIKIDATA" }} }}"#
        ))
        .unwrap();
    assert_eq!(none, "[]");
}

#[test]
fn malformed_request_rejected() {
    let dispatcher = procedure(ResolverConfig::default());
    let err = dispatcher.call_json("not json").unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn snapshot_and_config_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("graph.json");
    let config_path = dir.path().join("resolver.json");
    std::fs::write(&graph_path, SNAPSHOT).unwrap();
    std::fs::write(&config_path, r#"{ "enforce_labels": true }"#).unwrap();

    let graph = Arc::new(InMemoryGraph::from_json_path(&graph_path).unwrap());
    let config = ResolverConfig::from_path(&config_path).unwrap();
    let resolver = IdentityResolver::new(graph.clone(), config);

    let found = resolver.resolve_person_by_identifier("X123", "LOC").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(graph.open_read_transactions(), 0);
}
