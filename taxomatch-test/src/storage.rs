//! In-memory taxonomies at each build stage

use anyhow::{Context, Result};
use std::sync::Arc;

use taxomatch_core::{Config, NodeId};
use taxomatch_storage::{MemoryGraph, NodeIndexKind, TaxonStore};
use taxomatch_taxonomy::{LoadSummary, SingleParentPolicy, SynthesisSummary, Taxonomy};

use crate::fixtures::{fixture_config, ott, tree_of_life, TaxonomyFixture};

/// A taxonomy over a fresh [`MemoryGraph`] with handles to the underlying graph
pub struct TestTaxonomy {
    pub graph: Arc<MemoryGraph>,
    pub taxonomy: Taxonomy,
    pub load: LoadSummary,
    pub synthesis: Option<SynthesisSummary>,
}

impl TestTaxonomy {
    /// Load `fixture` into an empty graph
    pub fn load(fixture: TaxonomyFixture, config: Config) -> Result<Self> {
        let graph = Arc::new(MemoryGraph::new());
        let store: Arc<dyn TaxonStore> = graph.clone();
        let taxonomy = Taxonomy::new(store, config);

        let load = taxonomy
            .load(fixture.records, fixture.synonyms, fixture.deprecated, &fixture.metadata)
            .context("Failed to load fixture taxonomy")?;
        if !fixture.source_edges.is_empty() {
            taxonomy.load_source_edges(&fixture.source_edges)?;
        }

        Ok(Self {
            graph,
            taxonomy,
            load,
            synthesis: None,
        })
    }

    pub fn synthesize(mut self) -> Result<Self> {
        let summary = self
            .taxonomy
            .synthesize_preferred_hierarchy(&SingleParentPolicy)
            .context("Failed to synthesize fixture taxonomy")?;
        self.synthesis = Some(summary);
        Ok(self)
    }

    pub fn build_contexts(self) -> Result<Self> {
        self.taxonomy.build_contexts().context("Failed to build fixture contexts")?;
        Ok(self)
    }

    /// Node holding the taxon with `ott_id`
    pub fn node(&self, ott_id: u64) -> NodeId {
        node_for(&self.taxonomy, ott_id)
    }

    pub fn store(&self) -> &dyn TaxonStore {
        self.taxonomy.store()
    }
}

/// Node for an ott id; panics when the id is not loaded
pub fn node_for(taxonomy: &Taxonomy, ott_id: u64) -> NodeId {
    let hits = taxonomy
        .store()
        .exact_lookup(&NodeIndexKind::TaxonByOttId.index_name(""), &ott(ott_id).to_string())
        .expect("ott id lookup failed");
    *hits.first().unwrap_or_else(|| panic!("ott id {} is not loaded", ott_id))
}

/// Fixture tree loaded, nothing derived yet
pub fn loaded_taxonomy() -> TestTaxonomy {
    TestTaxonomy::load(tree_of_life(), fixture_config()).expect("fixture load failed")
}

/// Fixture tree with its preferred hierarchy
pub fn synthesized_taxonomy() -> TestTaxonomy {
    loaded_taxonomy().synthesize().expect("fixture synthesis failed")
}

/// Fixture tree ready for name resolution
pub fn built_taxonomy() -> TestTaxonomy {
    synthesized_taxonomy().build_contexts().expect("fixture context build failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn test_stages() {
        let loaded = loaded_taxonomy();
        assert_eq!(loaded.load.taxa, tree_of_life().records.len());
        assert!(!loaded.taxonomy.is_synthesized().unwrap());

        let built = built_taxonomy();
        assert!(built.taxonomy.is_synthesized().unwrap());
        assert!(built.taxonomy.contexts().unwrap().contains("Primates"));
        assert_ne!(built.node(HOMO_SAPIENS), built.node(PAN_TROGLODYTES));
    }
}
