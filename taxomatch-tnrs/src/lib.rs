//! Taxonomic name resolution
//!
//! Resolves batches of names against a built taxonomy, inferring the taxonomic context from
//! the unambiguous names, and serves prefix queries for autocomplete.

pub mod request;
pub mod resolver;
pub mod results;
pub mod scrubber;
pub mod service;

pub use request::{NameQuery, TnrsRequest};
pub use resolver::{AutocompleteMatch, ContextInference, MultiNameResolver, PrefixCaches, PrefixResolver};
pub use results::{TnrsMatch, TnrsNameResult, TnrsResults, PERFECT_SCORE};
pub use scrubber::{scrub_name, scrub_names};
pub use service::TnrsService;
