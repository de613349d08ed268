//! Barrier clades: higher taxa whose subtrees follow one nomenclatural code

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use taxomatch_core::config::{BarrierClade, BarrierConfig};
use taxomatch_core::{NodeId, Nomenclature, TaxomatchError, TaxomatchResult};
use taxomatch_storage::{BatchWriter, NodeIndexKind, TaxonStore};

use crate::model::{preferred_subtree, props, root_path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierMapping {
    pub clade: String,
    pub node: NodeId,
    pub nomenclature: Nomenclature,
}

/// Of several homonyms, the one closest to the root; the first wins ties
pub(crate) fn nearest_to_root(store: &dyn TaxonStore, hits: &[NodeId]) -> TaxomatchResult<Option<NodeId>> {
    let mut best: Option<(usize, NodeId)> = None;
    for hit in hits {
        let depth = root_path(store, *hit)?.len();
        if best.map(|(d, _)| depth < d).unwrap_or(true) {
            best = Some((depth, *hit));
        }
    }
    Ok(best.map(|(_, node)| node))
}

fn resolve_clade(store: &dyn TaxonStore, clade: &BarrierClade) -> TaxomatchResult<Option<NodeId>> {
    let by_name = NodeIndexKind::TaxonByName.index_name("");
    let by_synonym = NodeIndexKind::TaxonBySynonym.index_name("");

    let names = std::iter::once(&clade.name).chain(clade.alternate_names.iter());
    for name in names.clone() {
        let hits = store.exact_lookup(&by_name, name)?;
        if let Some(node) = nearest_to_root(store, &hits)? {
            return Ok(Some(node));
        }
    }
    for name in names {
        let hits = store.exact_lookup(&by_synonym, name)?;
        if let Some(node) = nearest_to_root(store, &hits)? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// Map each configured clade to a node, in configured order.
///
/// Clades with no match are skipped. Two clades landing on one node is an error.
pub fn resolve_barriers(store: &dyn TaxonStore, config: &BarrierConfig) -> TaxomatchResult<Vec<BarrierMapping>> {
    let mut mappings = Vec::new();
    let mut owner: HashMap<NodeId, String> = HashMap::new();

    for clade in &config.clades {
        let Some(node) = resolve_clade(store, clade)? else {
            warn!("Barrier clade '{}' not found in the taxonomy; skipping", clade.name);
            continue;
        };

        if let Some(first) = owner.get(&node) {
            return Err(TaxomatchError::DuplicateBarrierMapping {
                first: first.clone(),
                second: clade.name.clone(),
                node,
            });
        }
        owner.insert(node, clade.name.clone());
        debug!("Barrier clade '{}' resolved to node {}", clade.name, node);

        mappings.push(BarrierMapping {
            clade: clade.name.clone(),
            node,
            nomenclature: clade.nomenclature,
        });
    }
    Ok(mappings)
}

/// Stamp every taxon under each barrier with its code. Later barriers override earlier ones.
pub fn annotate_barriers(
    store: &dyn TaxonStore,
    mappings: &[BarrierMapping],
    batch_size: usize,
) -> TaxomatchResult<usize> {
    let mut writer = BatchWriter::new(store, batch_size);
    let mut annotated = 0usize;

    for mapping in mappings {
        let nodes = preferred_subtree(store, mapping.node)?;
        for node in &nodes {
            writer.set_property(*node, props::NOMENCLATURE, mapping.nomenclature.code())?;
        }
        debug!(
            "Annotated {} taxa under '{}' with {}",
            nodes.len(),
            mapping.clade,
            mapping.nomenclature
        );
        annotated += nodes.len();
    }

    writer.finish()?;
    info!("Applied {} barrier clades to {} taxa", mappings.len(), annotated);
    Ok(annotated)
}
