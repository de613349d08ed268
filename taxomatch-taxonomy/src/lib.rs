//! Taxonomy loading, preferred hierarchy synthesis and taxonomic contexts
//!
//! This crate turns flat taxonomy records into a graph held by a
//! [`TaxonStore`](taxomatch_storage::TaxonStore):
//!
//! - Loading: taxon, synonym and deprecated nodes with their child-of edges
//! - Synthesis: one preferred parent per taxon plus the name indexes and subtree sets
//!   derived from it
//! - Contexts: nomenclature barriers and named clades with their own indexes

pub mod context;
pub mod loader;
pub mod model;
pub mod subtree;
pub mod synthesis;
pub mod taxonomy;

pub use context::{BarrierMapping, ContextBuilder, ContextHierarchy, TaxonomyContext};
pub use loader::{LoadSummary, TaxonomyLoader};
pub use model::{
    DeprecatedRecord, DeprecatedTaxon, NodeKind, SourceEdgeRecord, SynonymRecord, Taxon, TaxonRecord,
};
pub use subtree::{SubtreeIndex, SubtreeSets};
pub use synthesis::{
    species_in_genus, ConflictResolvingPolicy, HierarchySynthesizer, PreferredEdgePolicy,
    SingleParentPolicy, SynthesisSummary,
};
pub use taxonomy::{TaxonLookup, Taxonomy};
