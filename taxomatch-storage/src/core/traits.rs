//! Storage query interface consumed by the taxonomy and resolver crates
use taxomatch_core::{NodeId, TaxomatchResult};

use super::batch::WriteBatch;
use super::types::{CommitStats, Direction, Edge, EdgeKind, IndexHit, IndexName, Properties, PropertyValue};

/// A transactional node/edge store with exact, prefix and fuzzy text indexes.
///
/// Index keys are case-insensitive. Lookups against an index that does not exist return no
/// hits. Reads never observe a partially applied batch.
pub trait TaxonStore: Send + Sync {
    /// Nodes stored under exactly `key`
    fn exact_lookup(&self, index: &IndexName, key: &str) -> TaxomatchResult<Vec<NodeId>>;

    /// Nodes whose key starts with `prefix`, ordered by key
    fn prefix_lookup(&self, index: &IndexName, prefix: &str) -> TaxomatchResult<Vec<IndexHit>>;

    /// Nodes whose key is within edit distance of `key`.
    ///
    /// Similarity is `1 - distance / min(len(key), len(candidate))`; hits must score strictly
    /// above `min_similarity`. Results are ordered by distance, then key.
    fn fuzzy_lookup(
        &self,
        index: &IndexName,
        key: &str,
        min_similarity: f64,
    ) -> TaxomatchResult<Vec<IndexHit>>;

    fn property(&self, node: NodeId, key: &str) -> TaxomatchResult<Option<PropertyValue>>;

    /// All properties of a node, or None when the node does not exist
    fn properties(&self, node: NodeId) -> TaxomatchResult<Option<Properties>>;

    fn edges(&self, node: NodeId, kind: EdgeKind, direction: Direction) -> TaxomatchResult<Vec<Edge>>;

    fn metadata(&self, key: &str) -> TaxomatchResult<Option<PropertyValue>>;

    fn metadata_entries(&self) -> TaxomatchResult<Vec<(String, PropertyValue)>>;

    fn node_exists(&self, node: NodeId) -> TaxomatchResult<bool>;

    /// Ids of every committed node, ascending
    fn node_ids(&self) -> TaxomatchResult<Vec<NodeId>>;

    /// Number of distinct keys held by an index
    fn index_len(&self, index: &IndexName) -> TaxomatchResult<usize>;

    /// Reserve an id for a node created by a later batch
    fn allocate_node_id(&self) -> NodeId;

    /// Apply every operation of `batch` or none of them
    fn commit(&self, batch: WriteBatch) -> TaxomatchResult<CommitStats>;

    /// First edge of `kind` in `direction`, if any
    fn first_edge(&self, node: NodeId, kind: EdgeKind, direction: Direction) -> TaxomatchResult<Option<Edge>> {
        Ok(self.edges(node, kind, direction)?.into_iter().next())
    }
}
