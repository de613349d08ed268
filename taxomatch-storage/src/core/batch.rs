//! Write batches
//!
//! Every mutation of a store goes through a [`WriteBatch`]. A batch is applied atomically by
//! [`TaxonStore::commit`]: either every operation becomes visible or none does. Long stages use
//! [`BatchWriter`], which commits after a bounded number of operations.

use taxomatch_core::{NodeId, TaxomatchResult};
use tracing::debug;

use super::traits::TaxonStore;
use super::types::{CommitStats, EdgeKind, IndexName, Properties, PropertyValue};

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    CreateNode {
        id: NodeId,
        properties: Properties,
    },
    CreateEdge {
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        properties: Properties,
    },
    SetProperty {
        node: NodeId,
        key: String,
        value: PropertyValue,
    },
    RemoveProperty {
        node: NodeId,
        key: String,
    },
    IndexAdd {
        index: IndexName,
        key: String,
        node: NodeId,
    },
    ClearIndex {
        index: IndexName,
    },
    /// Drop every edge of one kind
    RemoveEdges {
        kind: EdgeKind,
    },
    SetMetadata {
        key: String,
        value: PropertyValue,
    },
}

#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: BatchOp) {
        self.ops.push(op);
    }

    /// `id` must come from [`TaxonStore::allocate_node_id`]
    pub fn create_node(&mut self, id: NodeId, properties: Properties) {
        self.push(BatchOp::CreateNode { id, properties });
    }

    pub fn create_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, properties: Properties) {
        self.push(BatchOp::CreateEdge {
            from,
            to,
            kind,
            properties,
        });
    }

    pub fn set_property(&mut self, node: NodeId, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.push(BatchOp::SetProperty {
            node,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn remove_property(&mut self, node: NodeId, key: impl Into<String>) {
        self.push(BatchOp::RemoveProperty { node, key: key.into() });
    }

    pub fn index_add(&mut self, index: &IndexName, key: impl Into<String>, node: NodeId) {
        self.push(BatchOp::IndexAdd {
            index: index.clone(),
            key: key.into(),
            node,
        });
    }

    pub fn clear_index(&mut self, index: &IndexName) {
        self.push(BatchOp::ClearIndex { index: index.clone() });
    }

    pub fn remove_edges(&mut self, kind: EdgeKind) {
        self.push(BatchOp::RemoveEdges { kind });
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.push(BatchOp::SetMetadata {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Accumulates operations and commits every `batch_size` of them.
///
/// Operations still pending are discarded if the writer is dropped without [`finish`].
/// Reads through the store only see committed batches.
///
/// [`finish`]: BatchWriter::finish
pub struct BatchWriter<'a> {
    store: &'a dyn TaxonStore,
    batch: WriteBatch,
    batch_size: usize,
    stats: CommitStats,
    commits: usize,
}

impl<'a> BatchWriter<'a> {
    pub fn new(store: &'a dyn TaxonStore, batch_size: usize) -> Self {
        Self {
            store,
            batch: WriteBatch::new(),
            batch_size: batch_size.max(1),
            stats: CommitStats::default(),
            commits: 0,
        }
    }

    pub fn store(&self) -> &'a dyn TaxonStore {
        self.store
    }

    pub fn push(&mut self, op: BatchOp) -> TaxomatchResult<()> {
        self.batch.push(op);
        if self.batch.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    pub fn create_node(&mut self, id: NodeId, properties: Properties) -> TaxomatchResult<()> {
        self.push(BatchOp::CreateNode { id, properties })
    }

    pub fn create_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        properties: Properties,
    ) -> TaxomatchResult<()> {
        self.push(BatchOp::CreateEdge {
            from,
            to,
            kind,
            properties,
        })
    }

    pub fn set_property(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> TaxomatchResult<()> {
        self.push(BatchOp::SetProperty {
            node,
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn remove_property(&mut self, node: NodeId, key: impl Into<String>) -> TaxomatchResult<()> {
        self.push(BatchOp::RemoveProperty { node, key: key.into() })
    }

    pub fn index_add(&mut self, index: &IndexName, key: impl Into<String>, node: NodeId) -> TaxomatchResult<()> {
        self.push(BatchOp::IndexAdd {
            index: index.clone(),
            key: key.into(),
            node,
        })
    }

    pub fn clear_index(&mut self, index: &IndexName) -> TaxomatchResult<()> {
        self.push(BatchOp::ClearIndex { index: index.clone() })
    }

    pub fn remove_edges(&mut self, kind: EdgeKind) -> TaxomatchResult<()> {
        self.push(BatchOp::RemoveEdges { kind })
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> TaxomatchResult<()> {
        self.push(BatchOp::SetMetadata {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Commit whatever is pending
    pub fn flush(&mut self) -> TaxomatchResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.batch);
        let stats = self.store.commit(batch)?;
        self.commits += 1;
        debug!(
            "Committed batch {} ({} operations)",
            self.commits, stats.operations
        );
        self.stats.merge(stats);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Commit the remainder and return totals for the whole writer
    pub fn finish(mut self) -> TaxomatchResult<CommitStats> {
        self.flush()?;
        Ok(self.stats)
    }
}
