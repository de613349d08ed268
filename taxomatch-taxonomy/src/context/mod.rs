//! Nomenclatural barriers and taxonomic contexts

pub mod barriers;
pub mod hierarchy;

pub use barriers::{annotate_barriers, resolve_barriers, BarrierMapping};
pub use hierarchy::{contexts_by_group, ContextBuilder, ContextHierarchy, TaxonomyContext};
