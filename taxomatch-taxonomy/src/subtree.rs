//! Subtree membership sets and least inclusive common ancestors
//!
//! Every taxon in the preferred tree caches two id sets: the tips below it and the internal
//! nodes below it (itself included). Both come from one post-order pass over preferred edges.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use taxomatch_core::{create_spinner, NodeId, TaxomatchError, TaxomatchResult};
use taxomatch_storage::{BatchWriter, PropertyValue, TaxonStore};

use crate::model::{life_node, meta, preferred_children, preferred_subtree, props, root_path};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtreeSets {
    pub leaf_ids: Vec<NodeId>,
    pub internal_ids: Vec<NodeId>,
}

impl SubtreeSets {
    pub fn contains(&self, node: NodeId) -> bool {
        self.leaf_ids.contains(&node) || self.internal_ids.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.leaf_ids.len() + self.internal_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_ids.is_empty() && self.internal_ids.is_empty()
    }
}

pub struct SubtreeIndex<'a> {
    store: &'a dyn TaxonStore,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> SubtreeIndex<'a> {
    pub fn new(store: &'a dyn TaxonStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Compute and store the sets for every node below `root`. Returns the number of nodes.
    pub fn build(&self, root: NodeId) -> TaxomatchResult<usize> {
        let mut writer = BatchWriter::new(self.store, self.batch_size);
        let mut pending: HashMap<NodeId, SubtreeSets> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let pb = create_spinner("Building subtree sets", self.show_progress);

        // (node, children already pushed)
        let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
        let mut count = 0usize;

        while let Some((node, expanded)) = stack.pop() {
            if !expanded {
                if !visited.insert(node) {
                    return Err(TaxomatchError::MalformedTaxonomy(format!(
                        "node {} reached twice through preferred edges",
                        node
                    )));
                }
                stack.push((node, true));
                for child in preferred_children(self.store, node)? {
                    stack.push((child, false));
                }
                continue;
            }

            let children = preferred_children(self.store, node)?;
            let sets = if children.is_empty() {
                SubtreeSets {
                    leaf_ids: vec![node],
                    internal_ids: Vec::new(),
                }
            } else {
                let mut sets = SubtreeSets::default();
                for child in children {
                    if let Some(child_sets) = pending.remove(&child) {
                        sets.leaf_ids.extend(child_sets.leaf_ids);
                        sets.internal_ids.extend(child_sets.internal_ids);
                    }
                }
                sets.internal_ids.push(node);
                sets
            };

            writer.set_property(node, props::LEAF_IDS, PropertyValue::Ids(sets.leaf_ids.clone()))?;
            writer.set_property(
                node,
                props::INTERNAL_IDS,
                PropertyValue::Ids(sets.internal_ids.clone()),
            )?;
            pending.insert(node, sets);
            count += 1;
            pb.inc(1);
        }

        writer.finish()?;
        pb.finish_and_clear();
        info!("Built subtree sets for {} taxa", count);
        Ok(count)
    }

    /// Drop the cached sets below `root`
    pub fn remove_all(&self, root: NodeId) -> TaxomatchResult<usize> {
        let nodes = preferred_subtree(self.store, root)?;
        let mut writer = BatchWriter::new(self.store, self.batch_size);
        for node in &nodes {
            writer.remove_property(*node, props::LEAF_IDS)?;
            writer.remove_property(*node, props::INTERNAL_IDS)?;
        }
        writer.finish()?;
        debug!("Removed subtree sets from {} taxa", nodes.len());
        Ok(nodes.len())
    }

    /// Cached sets of `node`, or None when they have not been built
    pub fn sets(&self, node: NodeId) -> TaxomatchResult<Option<SubtreeSets>> {
        let leaf = self.store.property(node, props::LEAF_IDS)?;
        let internal = self.store.property(node, props::INTERNAL_IDS)?;
        Ok(match (leaf, internal) {
            (Some(PropertyValue::Ids(leaf_ids)), Some(PropertyValue::Ids(internal_ids))) => {
                Some(SubtreeSets {
                    leaf_ids,
                    internal_ids,
                })
            }
            _ => None,
        })
    }

    /// Every taxon in the preferred subtree of `node`
    pub fn subtree_members(&self, node: NodeId) -> TaxomatchResult<Vec<NodeId>> {
        let sets = self.sets(node)?.unwrap_or_default();
        let mut members = sets.leaf_ids;
        members.extend(sets.internal_ids);
        Ok(members)
    }

    /// Whether `taxon` lies in the preferred subtree of `ancestor` (a taxon descends from itself)
    pub fn is_descendant(&self, ancestor: NodeId, taxon: NodeId) -> TaxomatchResult<bool> {
        Ok(self
            .sets(ancestor)?
            .map(|sets| sets.contains(taxon))
            .unwrap_or(false))
    }

    /// Deepest taxon that is a preferred ancestor of every member.
    ///
    /// Members whose preferred paths never meet (e.g. a taxon cut off below a suppressed
    /// parent) yield `NoCommonAncestor`.
    pub fn compute_lica(&self, taxa: &[NodeId]) -> TaxomatchResult<NodeId> {
        self.require_synthesis()?;

        let (first, rest) = taxa.split_first().ok_or(TaxomatchError::EmptyTaxonSet)?;
        if rest.is_empty() {
            return Ok(*first);
        }

        let path = root_path(self.store, *first)?;
        let position: HashMap<NodeId, usize> = path.iter().enumerate().map(|(i, n)| (*n, i)).collect();

        let mut deepest_shared = 0usize;
        for taxon in rest {
            let shared = root_path(self.store, *taxon)?
                .into_iter()
                .find_map(|node| position.get(&node).copied())
                .ok_or(TaxomatchError::NoCommonAncestor {
                    first: *first,
                    other: *taxon,
                })?;
            deepest_shared = deepest_shared.max(shared);
        }
        Ok(path[deepest_shared])
    }

    /// Number of preferred edges on the path from `a` to `b` through their LICA
    pub fn internodal_distance(&self, a: NodeId, b: NodeId) -> TaxomatchResult<usize> {
        let lica = self.compute_lica(&[a, b])?;
        let steps = |node: NodeId| -> TaxomatchResult<usize> {
            root_path(self.store, node)?
                .iter()
                .position(|n| *n == lica)
                .ok_or(TaxomatchError::NoCommonAncestor { first: a, other: b })
        };
        Ok(steps(a)? + steps(b)?)
    }

    /// Whether the preferred path from `node` reaches the life node
    pub fn is_placed(&self, node: NodeId) -> TaxomatchResult<bool> {
        let life = life_node(self.store)?;
        Ok(root_path(self.store, node)?.last() == Some(&life))
    }

    fn require_synthesis(&self) -> TaxomatchResult<()> {
        let complete = self
            .store
            .metadata(meta::PREFERRED_COMPLETE)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if complete {
            Ok(())
        } else {
            Err(TaxomatchError::SynthesisIncomplete)
        }
    }
}
