//! Entry point tying the store, configuration and taxonomy operations together

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use taxomatch_core::config::{ContextDescriptor, ContextGroup};
use taxomatch_core::{Config, NodeId, OttId, TaxomatchError, TaxomatchResult};
use taxomatch_storage::{NodeIndexKind, PropertyValue, TaxonStore};

use crate::context::{
    annotate_barriers, contexts_by_group, resolve_barriers, BarrierMapping, ContextBuilder,
    ContextHierarchy, TaxonomyContext,
};
use crate::loader::{LoadSummary, TaxonomyLoader};
use crate::model::{
    life_node, meta, DeprecatedRecord, DeprecatedTaxon, SourceEdgeRecord, SynonymRecord, Taxon,
    TaxonRecord,
};
use crate::subtree::SubtreeIndex;
use crate::synthesis::{HierarchySynthesizer, PreferredEdgePolicy, SynthesisSummary};

/// Result of an ott id lookup
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonLookup {
    Current(Taxon),
    Deprecated(DeprecatedTaxon),
}

pub struct Taxonomy {
    store: Arc<dyn TaxonStore>,
    config: Config,
    contexts: RwLock<Option<Arc<ContextHierarchy>>>,
}

impl Taxonomy {
    pub fn new(store: Arc<dyn TaxonStore>, config: Config) -> Self {
        Self {
            store,
            config,
            contexts: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &dyn TaxonStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn life_node(&self) -> TaxomatchResult<NodeId> {
        life_node(self.store())
    }

    pub fn load(
        &self,
        records: Vec<TaxonRecord>,
        synonyms: Vec<SynonymRecord>,
        deprecated: Vec<DeprecatedRecord>,
        metadata: &IndexMap<String, String>,
    ) -> TaxomatchResult<LoadSummary> {
        TaxonomyLoader::new(self.store(), &self.config).load(records, synonyms, deprecated, metadata)
    }

    pub fn load_source_edges(&self, edges: &[SourceEdgeRecord]) -> TaxomatchResult<usize> {
        TaxonomyLoader::new(self.store(), &self.config).load_source_edges(edges)
    }

    pub fn synthesize_preferred_hierarchy(&self, policy: &dyn PreferredEdgePolicy) -> TaxomatchResult<SynthesisSummary> {
        HierarchySynthesizer::new(self.store(), &self.config.synthesis).synthesize(policy)
    }

    pub fn is_synthesized(&self) -> TaxomatchResult<bool> {
        Ok(self
            .store
            .metadata(meta::PREFERRED_COMPLETE)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    /// Resolve the barrier clades and stamp their subtrees with nomenclatural codes
    pub fn annotate_barriers(&self) -> TaxomatchResult<Vec<BarrierMapping>> {
        let mappings = resolve_barriers(self.store(), &self.config.barriers)?;
        annotate_barriers(self.store(), &mappings, self.config.synthesis.batch_size)?;
        Ok(mappings)
    }

    /// Apply barriers, then build and materialize every configured context
    pub fn build_contexts(&self) -> TaxomatchResult<Arc<ContextHierarchy>> {
        if !self.is_synthesized()? {
            return Err(TaxomatchError::SynthesisIncomplete);
        }
        let life = self.life_node()?;
        self.annotate_barriers()?;

        let hierarchy = ContextBuilder::new(self.store(), &self.config.contexts, self.config.synthesis.batch_size)
            .build(life)?;
        let hierarchy = Arc::new(hierarchy);
        *self.contexts.write() = Some(Arc::clone(&hierarchy));
        Ok(hierarchy)
    }

    /// The built context hierarchy, read from the store on first use
    pub fn contexts(&self) -> TaxomatchResult<Arc<ContextHierarchy>> {
        if let Some(hierarchy) = self.contexts.read().as_ref() {
            return Ok(Arc::clone(hierarchy));
        }

        let loaded = ContextHierarchy::load(self.store())?.ok_or_else(|| {
            TaxomatchError::ContextNotFound(self.config.contexts.life_context.clone())
        })?;
        let loaded = Arc::new(loaded);
        *self.contexts.write() = Some(Arc::clone(&loaded));
        info!("Loaded {} contexts from the store", loaded.len());
        Ok(loaded)
    }

    pub fn context(&self, name: &str) -> TaxomatchResult<TaxonomyContext> {
        Ok(self.contexts()?.get(name)?.clone())
    }

    /// Least inclusive context containing `node`
    pub fn home_context(&self, node: NodeId) -> TaxomatchResult<TaxonomyContext> {
        let taxon = Taxon::require(self.store(), node)?;
        Ok(self.contexts()?.home_context(&taxon).clone())
    }

    pub fn contexts_by_group(&self) -> IndexMap<ContextGroup, Vec<ContextDescriptor>> {
        contexts_by_group(&self.config.contexts)
    }

    pub fn taxon(&self, node: NodeId) -> TaxomatchResult<Option<Taxon>> {
        Taxon::load(self.store(), node)
    }

    /// Current taxon for `ott_id`, falling back to the deprecated ids
    pub fn taxon_by_ott_id(&self, ott_id: OttId) -> TaxomatchResult<Option<TaxonLookup>> {
        let hits = self
            .store
            .exact_lookup(&NodeIndexKind::TaxonByOttId.index_name(""), &ott_id.to_string())?;

        for hit in &hits {
            if let Some(taxon) = Taxon::load(self.store(), *hit)? {
                return Ok(Some(TaxonLookup::Current(taxon)));
            }
        }
        for hit in &hits {
            if let Some(deprecated) = DeprecatedTaxon::load(self.store(), *hit)? {
                return Ok(Some(TaxonLookup::Deprecated(deprecated)));
            }
        }
        Ok(None)
    }

    pub fn subtree(&self) -> SubtreeIndex<'_> {
        SubtreeIndex::new(self.store(), self.config.synthesis.batch_size)
            .with_progress(self.config.synthesis.show_progress)
    }

    pub fn compute_lica(&self, taxa: &[NodeId]) -> TaxomatchResult<NodeId> {
        self.subtree().compute_lica(taxa)
    }

    pub fn internodal_distance(&self, a: NodeId, b: NodeId) -> TaxomatchResult<usize> {
        self.subtree().internodal_distance(a, b)
    }

    pub fn is_descendant(&self, ancestor: NodeId, taxon: NodeId) -> TaxomatchResult<bool> {
        self.subtree().is_descendant(ancestor, taxon)
    }

    /// Whether `node` hangs from the life node through preferred edges
    pub fn is_placed(&self, node: NodeId) -> TaxomatchResult<bool> {
        self.subtree().is_placed(node)
    }

    /// Caller-supplied taxonomy metadata, e.g. version and source
    pub fn metadata(&self) -> TaxomatchResult<IndexMap<String, String>> {
        let mut metadata = IndexMap::new();
        for (key, value) in self.store.metadata_entries()? {
            if let (Some(key), PropertyValue::Text(value)) = (key.strip_prefix(meta::TAXONOMY_PREFIX), value) {
                metadata.insert(key.to_string(), value);
            }
        }
        Ok(metadata)
    }
}
