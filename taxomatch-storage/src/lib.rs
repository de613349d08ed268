//! Graph storage for taxomatch
//!
//! Exposes the [`TaxonStore`] query interface, write batches and the in-memory
//! [`MemoryGraph`] backend with its text indexes.

pub mod backend;
pub mod cache;
pub mod core;
pub mod index;

// Re-export commonly used types and traits from core
pub use core::{
    BatchOp, BatchWriter, CommitStats, Direction, Edge, EdgeId, EdgeKind, IndexHit, IndexName,
    Properties, PropertyValue, TaxonStore, WriteBatch,
};

pub use backend::{GraphStats, MemoryGraph};
pub use cache::LookupCache;
pub use index::{IndexScope, NodeIndexKind, TextIndex};
