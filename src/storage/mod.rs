//! Graph storage for crm-ident.
//!
//! The traits define the adapter contract the resolver consumes. The
//! in-memory backend is a reference implementation for embedding and tests.

pub mod memory;
mod traits;

pub use memory::InMemoryGraph;
pub use traits::{GraphStore, ReadTransaction, StorageError};
