//! In-memory arena implementation of [`TaxonStore`]
//!
//! Nodes and edges live in vectors indexed by their ids. Adjacency is kept per
//! (node, edge kind) in both directions so every relation type has its own edge list.
//! Slots freed by removing an edge kind are reused by later edges, so resynthesis does
//! not grow the edge arena.
//! A whole batch is validated against the committed state before anything is applied,
//! then applied under a single write lock.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

use taxomatch_core::{NodeId, TaxomatchError, TaxomatchResult};

use crate::core::{
    BatchOp, CommitStats, Direction, Edge, EdgeId, EdgeKind, IndexHit, IndexName, Properties,
    PropertyValue, TaxonStore, WriteBatch,
};
use crate::index::TextIndex;

#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<Option<Properties>>,
    edges: Vec<Option<Edge>>,
    free_edges: Vec<EdgeId>,
    outgoing: HashMap<(NodeId, EdgeKind), Vec<EdgeId>>,
    incoming: HashMap<(NodeId, EdgeKind), Vec<EdgeId>>,
    indexes: HashMap<IndexName, TextIndex>,
    metadata: Properties,
}

impl GraphState {
    fn node_exists(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node.index()), Some(Some(_)))
    }

    fn node_mut(&mut self, node: NodeId) -> TaxomatchResult<&mut Properties> {
        self.nodes
            .get_mut(node.index())
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| TaxomatchError::Storage(format!("Node {} does not exist", node)))
    }

    fn collect_edges(&self, ids: Option<&Vec<EdgeId>>) -> Vec<Edge> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.edges.get(id.0 as usize).and_then(|e| e.clone()))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Reject the batch if any operation would reference a node that neither exists nor is
    /// created earlier in the same batch.
    fn validate(&self, ops: &[BatchOp], allocated: u32) -> TaxomatchResult<()> {
        let mut created: HashSet<NodeId> = HashSet::new();
        let known = |node: NodeId, created: &HashSet<NodeId>| {
            self.node_exists(node) || created.contains(&node)
        };

        for (position, op) in ops.iter().enumerate() {
            let missing = match op {
                BatchOp::CreateNode { id, .. } => {
                    if id.0 >= allocated {
                        return Err(TaxomatchError::Storage(format!(
                            "Operation {}: node id {} was never allocated",
                            position, id
                        )));
                    }
                    if known(*id, &created) {
                        return Err(TaxomatchError::Storage(format!(
                            "Operation {}: node {} already exists",
                            position, id
                        )));
                    }
                    created.insert(*id);
                    None
                }
                BatchOp::CreateEdge { from, to, .. } => [*from, *to]
                    .into_iter()
                    .find(|node| !known(*node, &created)),
                BatchOp::SetProperty { node, .. }
                | BatchOp::RemoveProperty { node, .. }
                | BatchOp::IndexAdd { node, .. } => Some(*node).filter(|n| !known(*n, &created)),
                BatchOp::ClearIndex { .. } | BatchOp::RemoveEdges { .. } | BatchOp::SetMetadata { .. } => {
                    None
                }
            };

            if let Some(node) = missing {
                return Err(TaxomatchError::Storage(format!(
                    "Operation {}: node {} does not exist",
                    position, node
                )));
            }
        }
        Ok(())
    }

    fn apply(&mut self, op: BatchOp, stats: &mut CommitStats) -> TaxomatchResult<()> {
        match op {
            BatchOp::CreateNode { id, properties } => {
                if self.nodes.len() <= id.index() {
                    self.nodes.resize(id.index() + 1, None);
                }
                self.nodes[id.index()] = Some(properties);
                stats.nodes_created += 1;
            }
            BatchOp::CreateEdge {
                from,
                to,
                kind,
                properties,
            } => {
                let edge = |id| Edge {
                    id,
                    from,
                    to,
                    kind,
                    properties,
                };
                let id = match self.free_edges.pop() {
                    Some(id) => {
                        self.edges[id.0 as usize] = Some(edge(id));
                        id
                    }
                    None => {
                        let id = EdgeId(self.edges.len() as u32);
                        self.edges.push(Some(edge(id)));
                        id
                    }
                };
                self.outgoing.entry((from, kind)).or_default().push(id);
                self.incoming.entry((to, kind)).or_default().push(id);
                stats.edges_created += 1;
            }
            BatchOp::SetProperty { node, key, value } => {
                self.node_mut(node)?.insert(key, value);
            }
            BatchOp::RemoveProperty { node, key } => {
                self.node_mut(node)?.remove(&key);
            }
            BatchOp::IndexAdd { index, key, node } => {
                if self.indexes.entry(index).or_default().add(&key, node) {
                    stats.index_entries += 1;
                }
            }
            BatchOp::ClearIndex { index } => {
                if let Some(index) = self.indexes.get_mut(&index) {
                    index.clear();
                }
            }
            BatchOp::RemoveEdges { kind } => {
                for (position, slot) in self.edges.iter_mut().enumerate() {
                    if slot.as_ref().map(|e| e.kind == kind).unwrap_or(false) {
                        *slot = None;
                        self.free_edges.push(EdgeId(position as u32));
                    }
                }
                self.outgoing.retain(|(_, k), _| *k != kind);
                self.incoming.retain(|(_, k), _| *k != kind);
            }
            BatchOp::SetMetadata { key, value } => {
                self.metadata.insert(key, value);
            }
        }
        stats.operations += 1;
        Ok(())
    }
}

/// Thread-safe in-memory taxon graph
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
    next_node: AtomicU32,
}

/// Node and edge counts of a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Allocated edge slots, live or free
    pub edge_slots: usize,
    pub indexes: usize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> GraphStats {
        let state = self.state.read();
        GraphStats {
            nodes: state.nodes.iter().filter(|n| n.is_some()).count(),
            edges: state.edges.iter().filter(|e| e.is_some()).count(),
            edge_slots: state.edges.len(),
            indexes: state.indexes.len(),
        }
    }

    /// Names of every index that has been written to
    pub fn index_names(&self) -> Vec<IndexName> {
        let mut names: Vec<IndexName> = self.state.read().indexes.keys().cloned().collect();
        names.sort();
        names
    }
}

impl TaxonStore for MemoryGraph {
    fn exact_lookup(&self, index: &IndexName, key: &str) -> TaxomatchResult<Vec<NodeId>> {
        let state = self.state.read();
        Ok(state
            .indexes
            .get(index)
            .map(|idx| idx.exact(key))
            .unwrap_or_default())
    }

    fn prefix_lookup(&self, index: &IndexName, prefix: &str) -> TaxomatchResult<Vec<IndexHit>> {
        let state = self.state.read();
        Ok(state
            .indexes
            .get(index)
            .map(|idx| idx.prefix(prefix))
            .unwrap_or_default())
    }

    fn fuzzy_lookup(
        &self,
        index: &IndexName,
        key: &str,
        min_similarity: f64,
    ) -> TaxomatchResult<Vec<IndexHit>> {
        let state = self.state.read();
        Ok(state
            .indexes
            .get(index)
            .map(|idx| idx.fuzzy(key, min_similarity))
            .unwrap_or_default())
    }

    fn property(&self, node: NodeId, key: &str) -> TaxomatchResult<Option<PropertyValue>> {
        let state = self.state.read();
        Ok(state
            .nodes
            .get(node.index())
            .and_then(|slot| slot.as_ref())
            .and_then(|props| props.get(key).cloned()))
    }

    fn properties(&self, node: NodeId) -> TaxomatchResult<Option<Properties>> {
        let state = self.state.read();
        Ok(state.nodes.get(node.index()).and_then(|slot| slot.clone()))
    }

    fn edges(&self, node: NodeId, kind: EdgeKind, direction: Direction) -> TaxomatchResult<Vec<Edge>> {
        let state = self.state.read();
        let ids = match direction {
            Direction::Outgoing => state.outgoing.get(&(node, kind)),
            Direction::Incoming => state.incoming.get(&(node, kind)),
        };
        Ok(state.collect_edges(ids))
    }

    fn metadata(&self, key: &str) -> TaxomatchResult<Option<PropertyValue>> {
        Ok(self.state.read().metadata.get(key).cloned())
    }

    fn metadata_entries(&self) -> TaxomatchResult<Vec<(String, PropertyValue)>> {
        Ok(self
            .state
            .read()
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn node_exists(&self, node: NodeId) -> TaxomatchResult<bool> {
        Ok(self.state.read().node_exists(node))
    }

    fn node_ids(&self) -> TaxomatchResult<Vec<NodeId>> {
        let state = self.state.read();
        Ok(state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i as u32))
            .collect())
    }

    fn index_len(&self, index: &IndexName) -> TaxomatchResult<usize> {
        Ok(self
            .state
            .read()
            .indexes
            .get(index)
            .map(|idx| idx.len())
            .unwrap_or(0))
    }

    fn allocate_node_id(&self) -> NodeId {
        NodeId(self.next_node.fetch_add(1, Ordering::SeqCst))
    }

    fn commit(&self, batch: WriteBatch) -> TaxomatchResult<CommitStats> {
        let mut state = self.state.write();
        state.validate(batch.ops(), self.next_node.load(Ordering::SeqCst))?;

        let mut stats = CommitStats::default();
        for op in batch.into_ops() {
            state.apply(op, &mut stats)?;
        }
        debug!(
            "Applied {} operations ({} nodes, {} edges, {} index entries)",
            stats.operations, stats.nodes_created, stats.edges_created, stats.index_entries
        );
        Ok(stats)
    }
}
