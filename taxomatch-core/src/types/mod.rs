//! Shared types for taxomatch crates

pub mod flags;
pub mod ids;
pub mod nomenclature;
pub mod rank;

pub use flags::{evaluate_flags, FlagEvaluation, TaxonFlag};
pub use ids::{NodeId, OttId};
pub use nomenclature::Nomenclature;
pub use rank::Rank;
