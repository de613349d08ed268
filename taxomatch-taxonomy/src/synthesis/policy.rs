//! Strategies for choosing each taxon's preferred parent

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use taxomatch_core::{NodeId, TaxomatchError, TaxomatchResult};
use taxomatch_storage::{BatchWriter, Direction, Edge, EdgeKind, Properties, TaxonStore};

use crate::model::{full_subtree, props, Taxon};

/// Chooses one child-of edge per taxon and writes it as a preferred edge.
///
/// Implementations only see committed state through `store`; edges they write are pending in
/// `writer` until the caller flushes it.
pub trait PreferredEdgePolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the number of preferred edges written
    fn assign(&self, store: &dyn TaxonStore, life: NodeId, writer: &mut BatchWriter<'_>) -> TaxomatchResult<usize>;
}

fn preferred_edge_properties(edge: &Edge) -> Properties {
    let mut properties = Properties::new();
    if let Some(source) = edge.source() {
        properties.insert(props::SOURCE.to_string(), source.into());
    }
    properties
}

/// Every taxon has exactly one parent; suppressed taxa get no preferred edge
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleParentPolicy;

impl PreferredEdgePolicy for SingleParentPolicy {
    fn name(&self) -> &'static str {
        "single-parent"
    }

    fn assign(&self, store: &dyn TaxonStore, _life: NodeId, writer: &mut BatchWriter<'_>) -> TaxomatchResult<usize> {
        let mut created = 0usize;
        let mut suppressed = 0usize;

        for node in store.node_ids()? {
            let Some(taxon) = Taxon::load(store, node)? else {
                continue;
            };
            if taxon.dubious {
                suppressed += 1;
                continue;
            }

            let parent_edge = store
                .edges(node, EdgeKind::ChildOf, Direction::Outgoing)?
                .into_iter()
                .find(|e| !e.is_self_loop());
            if let Some(edge) = parent_edge {
                writer.create_edge(node, edge.to, EdgeKind::PreferredChildOf, preferred_edge_properties(&edge))?;
                created += 1;
            }
        }

        info!(
            "Created {} preferred edges, {} suppressed taxa left out",
            created, suppressed
        );
        Ok(created)
    }
}

/// Reconciles taxa with several parents from different source classifications.
///
/// Where parents disagree, the edge from the highest-priority trusted source wins. Everything
/// else is resolved by walking from each tip toward the root.
#[derive(Debug, Clone)]
pub struct ConflictResolvingPolicy {
    trusted_sources: Vec<String>,
}

impl ConflictResolvingPolicy {
    pub fn new(trusted_sources: Vec<String>) -> Self {
        Self { trusted_sources }
    }

    pub fn trusted_sources(&self) -> &[String] {
        &self.trusted_sources
    }

    fn node_name(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<String> {
        Ok(store
            .property(node, props::NAME)?
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    /// Trusted edge for `node` when its parents disagree by name
    fn resolve_conflict(&self, store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Option<Edge>> {
        let edges = store.edges(node, EdgeKind::ChildOf, Direction::Outgoing)?;

        let mut parent_name: Option<String> = None;
        let mut conflict = false;
        for edge in &edges {
            if edge.is_self_loop() {
                warn!("Node {} has a child-of edge pointing at itself", node);
                continue;
            }
            let name = Self::node_name(store, edge.to)?;
            match &parent_name {
                None => parent_name = Some(name),
                Some(first) if *first != name => conflict = true,
                Some(_) => {}
            }
        }
        if !conflict {
            return Ok(None);
        }

        let trusted = self.trusted_sources.iter().find_map(|source| {
            edges
                .iter()
                .find(|e| e.source() == Some(source.as_str()))
                .cloned()
        });
        match trusted {
            Some(edge) if edge.is_self_loop() => {
                Err(TaxomatchError::SelfReferencingPreferredEdge { node })
            }
            other => Ok(other),
        }
    }
}

impl PreferredEdgePolicy for ConflictResolvingPolicy {
    fn name(&self) -> &'static str {
        "conflict-resolving"
    }

    fn assign(&self, store: &dyn TaxonStore, life: NodeId, writer: &mut BatchWriter<'_>) -> TaxomatchResult<usize> {
        let order = full_subtree(store, life)?;
        let mut preferred: HashMap<NodeId, NodeId> = HashMap::new();

        for node in &order {
            if let Some(edge) = self.resolve_conflict(store, *node)? {
                writer.create_edge(*node, edge.to, EdgeKind::PreferredChildOf, preferred_edge_properties(&edge))?;
                preferred.insert(*node, edge.to);
            }
        }
        let conflicts = preferred.len();
        debug!("Resolved {} conflicting parents from trusted sources", conflicts);

        let mut visited: HashSet<NodeId> = HashSet::new();
        for tip in &order {
            if !store.edges(*tip, EdgeKind::ChildOf, Direction::Incoming)?.is_empty() {
                continue;
            }

            let mut current = *tip;
            while current != life {
                if !visited.insert(current) {
                    break;
                }

                let parent = match preferred.get(&current) {
                    Some(parent) => *parent,
                    None => {
                        let edge = store
                            .edges(current, EdgeKind::ChildOf, Direction::Outgoing)?
                            .into_iter()
                            .find(|e| !e.is_self_loop())
                            .ok_or(TaxomatchError::DeadEndWalk { node: current })?;
                        writer.create_edge(
                            current,
                            edge.to,
                            EdgeKind::PreferredChildOf,
                            preferred_edge_properties(&edge),
                        )?;
                        preferred.insert(current, edge.to);
                        edge.to
                    }
                };

                current = parent;
            }
        }

        info!(
            "Created {} preferred edges ({} from trusted sources)",
            preferred.len(),
            conflicts
        );
        Ok(preferred.len())
    }
}
