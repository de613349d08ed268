pub mod names;
pub mod text;

pub use names::{IndexScope, NodeIndexKind};
pub use text::{normalize_key, similarity, TextIndex};
