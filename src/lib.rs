//! # crm-ident - Person resolution over CIDOC-CRM identifier assignments
//!
//! Resolves a person from an identifier literal and the authority that
//! assigned it, against a property graph following the CIDOC-CRM event
//! pattern: an `E15 Identifier Assignment` node links an `E42 Identifier`,
//! the `E39 Actor` who assigned it, and the `E21 Person` it was assigned to.
//!
//! ## Core Concepts
//!
//! - **GraphStore / ReadTransaction**: the read-only adapter contract a storage engine implements
//! - **IdentityResolver**: match-then-aggregate traversal producing [`PersonMatch`] records
//! - **CrmSchema**: the label and relationship vocabulary being read
//! - **Procedure**: by-name invocation with parameter checking
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crm_ident::{IdentityResolver, InMemoryGraph};
//!
//! let graph = Arc::new(InMemoryGraph::from_json_path("graph.json")?);
//! let resolver = IdentityResolver::with_defaults(graph);
//! for m in resolver.resolve_person_by_identifier("X123", "LOC")? {
//!     println!("{} {:?}", m.person, m.identifiers);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod procedure;
pub mod resolver;
pub mod schema;
pub mod storage;
pub mod value;

pub use config::{ResolverConfig, DEFAULT_PROCEDURE_NAME};
pub use error::{DataIssue, ExecutionError, ResolveError, ResolveResult, ValidationError};
pub use graph::{GraphSnapshot, NodeId, NodeRecord, NodeSpec, Relationship, RelationshipSpec};
pub use logging::LoggingConfig;
pub use procedure::{Procedure, ProcedureCall};
pub use resolver::{IdentityResolver, PersonMatch};
pub use schema::CrmSchema;
pub use storage::{GraphStore, InMemoryGraph, ReadTransaction, StorageError};
pub use value::PropertyValue;
