//! Name resolution strategies

pub mod multi_name;
pub mod prefix;
pub mod scoring;

pub use multi_name::{ContextInference, MultiNameResolver};
pub use prefix::{sort_suggestions, AutocompleteMatch, PrefixCaches, PrefixResolver};
