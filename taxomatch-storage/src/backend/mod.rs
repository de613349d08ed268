//! Storage backend implementations

mod memory;

pub use memory::{GraphStats, MemoryGraph};
