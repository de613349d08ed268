pub mod batch;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use batch::{BatchOp, BatchWriter, WriteBatch};
pub use traits::TaxonStore;
pub use types::{
    CommitStats, Direction, Edge, EdgeId, EdgeKind, IndexHit, IndexName, Properties, PropertyValue,
};
