//! Preferred hierarchy synthesis
//!
//! Reduces the multi-parent child-of graph to one preferred tree, then rebuilds every index
//! derived from it. The completion flag is cleared first and set last, so LICA queries are
//! refused while a synthesis is partway through.

pub mod indexing;
pub mod policy;

pub use indexing::{index_entries, IndexPopulator};
pub use policy::{ConflictResolvingPolicy, PreferredEdgePolicy, SingleParentPolicy};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use taxomatch_core::config::SynthesisConfig;
use taxomatch_core::{create_progress_bar, NodeId, TaxomatchResult};
use taxomatch_storage::{BatchWriter, EdgeKind, IndexScope, NodeIndexKind, TaxonStore};

use crate::model::{life_node, meta, preferred_subtree, synonym_names, Taxon};
use crate::subtree::SubtreeIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub policy: String,
    pub preferred_edges: usize,
    pub indexed_taxa: usize,
    pub suppressed_taxa: usize,
    pub species_by_genus: usize,
    pub subtree_nodes: usize,
}

pub struct HierarchySynthesizer<'a> {
    store: &'a dyn TaxonStore,
    config: &'a SynthesisConfig,
}

impl<'a> HierarchySynthesizer<'a> {
    pub fn new(store: &'a dyn TaxonStore, config: &'a SynthesisConfig) -> Self {
        Self { store, config }
    }

    pub fn synthesize(&self, policy: &dyn PreferredEdgePolicy) -> TaxomatchResult<SynthesisSummary> {
        let life = life_node(self.store)?;
        let subtree = SubtreeIndex::new(self.store, self.config.batch_size).with_progress(self.config.show_progress);
        let populator = IndexPopulator::new("");
        info!("Synthesizing preferred hierarchy with the {} policy", policy.name());

        let mut summary = SynthesisSummary {
            policy: policy.name().to_string(),
            ..Default::default()
        };

        let mut writer = BatchWriter::new(self.store, self.config.batch_size);
        writer.set_metadata(meta::PREFERRED_COMPLETE, false)?;
        writer.flush()?;

        subtree.remove_all(life)?;
        writer.remove_edges(EdgeKind::PreferredChildOf)?;
        populator.clear(&mut writer)?;
        writer.clear_index(&NodeIndexKind::PreferredSpeciesByGenus.index_name(""))?;
        writer.flush()?;

        summary.preferred_edges = policy.assign(self.store, life, &mut writer)?;
        writer.flush()?;

        let (indexed, suppressed) = self.index_all_taxa(&populator, &mut writer)?;
        summary.indexed_taxa = indexed;
        summary.suppressed_taxa = suppressed;
        writer.flush()?;

        summary.species_by_genus = self.index_species_by_genus(&mut writer)?;
        writer.flush()?;

        summary.subtree_nodes = subtree.build(life)?;

        writer.set_metadata(meta::PREFERRED_COMPLETE, true)?;
        let stats = writer.finish()?;
        debug!("Synthesis committed {} operations after the policy ran", stats.operations);

        info!(
            "Preferred hierarchy complete: {} preferred edges, {} taxa indexed ({} suppressed)",
            summary.preferred_edges, summary.indexed_taxa, summary.suppressed_taxa
        );
        Ok(summary)
    }

    /// Full entries for every taxon, preferred entries for those not suppressed
    fn index_all_taxa(&self, populator: &IndexPopulator, writer: &mut BatchWriter<'_>) -> TaxomatchResult<(usize, usize)> {
        let nodes = self.store.node_ids()?;
        let pb = create_progress_bar(nodes.len() as u64, "Indexing taxa", self.config.show_progress);
        let mut indexed = 0usize;
        let mut suppressed = 0usize;

        for node in nodes {
            pb.inc(1);
            let Some(taxon) = Taxon::load(self.store, node)? else {
                continue;
            };
            let synonyms = synonym_names(self.store, node)?;
            populator.add(writer, node, &taxon.name, &taxon.rank, &synonyms, IndexScope::Full)?;
            if taxon.dubious {
                suppressed += 1;
            } else {
                populator.add(writer, node, &taxon.name, &taxon.rank, &synonyms, IndexScope::Preferred)?;
            }
            indexed += 1;
        }
        pb.finish_and_clear();
        Ok((indexed, suppressed))
    }

    /// Specific-rank preferred descendants of each preferred genus, keyed by the genus ott id
    fn index_species_by_genus(&self, writer: &mut BatchWriter<'_>) -> TaxomatchResult<usize> {
        let genera = self
            .store
            .exact_lookup(&NodeIndexKind::PreferredTaxonByRank.index_name(""), "genus")?;
        let index = NodeIndexKind::PreferredSpeciesByGenus.index_name("");
        let mut entries = 0usize;

        for genus in genera {
            let genus_taxon = Taxon::require(self.store, genus)?;
            let key = genus_taxon.ott_id.to_string();
            for node in preferred_subtree(self.store, genus)?.into_iter().skip(1) {
                if let Some(taxon) = Taxon::load(self.store, node)? {
                    if taxon.rank.is_specific() {
                        writer.index_add(&index, key.as_str(), node)?;
                        entries += 1;
                    }
                }
            }
        }
        debug!("Indexed {} species under their genera", entries);
        Ok(entries)
    }
}

/// Species and infraspecific taxa filed under a genus
pub fn species_in_genus(store: &dyn TaxonStore, genus: &Taxon) -> TaxomatchResult<Vec<NodeId>> {
    store.exact_lookup(
        &NodeIndexKind::PreferredSpeciesByGenus.index_name(""),
        &genus.ott_id.to_string(),
    )
}
