//! Entry points for name resolution over a built taxonomy

use std::sync::Arc;
use tracing::debug;

use taxomatch_core::config::TnrsConfig;
use taxomatch_core::{OttId, TaxomatchResult};
use taxomatch_taxonomy::{ContextHierarchy, TaxonLookup, Taxonomy};

use crate::request::TnrsRequest;
use crate::resolver::{AutocompleteMatch, ContextInference, MultiNameResolver, PrefixCaches, PrefixResolver};
use crate::results::TnrsResults;

const CACHE_CAPACITY: usize = 10_000;

/// Name resolution over one taxonomy.
///
/// Queries are independent and may run from several threads; the autocomplete caches are
/// shared. Call [`TnrsService::clear_caches`] after rebuilding contexts.
pub struct TnrsService<'a> {
    taxonomy: &'a Taxonomy,
    config: TnrsConfig,
    caches: PrefixCaches,
}

impl<'a> TnrsService<'a> {
    /// Service using the taxonomy's own resolver settings
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self::with_config(taxonomy, taxonomy.config().tnrs.clone())
    }

    pub fn with_config(taxonomy: &'a Taxonomy, config: TnrsConfig) -> Self {
        Self {
            taxonomy,
            config,
            caches: PrefixCaches::new(CACHE_CAPACITY),
        }
    }

    pub fn config(&self) -> &TnrsConfig {
        &self.config
    }

    pub fn infer_context(&self, names: &[String]) -> TaxomatchResult<ContextInference> {
        MultiNameResolver::new(self.taxonomy, &self.config).infer_context(names)
    }

    pub fn resolve_names(&self, request: &TnrsRequest) -> TaxomatchResult<TnrsResults> {
        MultiNameResolver::new(self.taxonomy, &self.config).resolve(request)
    }

    /// Suggestions for a partially typed name, searched in `context` or all life
    pub fn autocomplete(
        &self,
        prefix: &str,
        context: Option<&str>,
        include_dubious: bool,
    ) -> TaxomatchResult<Vec<AutocompleteMatch>> {
        let hierarchy = self.taxonomy.contexts()?;
        let context = match context {
            Some(name) => hierarchy.get(name)?,
            None => hierarchy.life(),
        };

        let matches = PrefixResolver::new(self.taxonomy.store(), &self.config, context, &self.caches)
            .include_dubious(include_dubious)
            .search(prefix)?;
        debug!("Autocomplete '{}' in '{}': {} suggestions", prefix, context.name(), matches.len());
        Ok(matches)
    }

    pub fn contexts(&self) -> TaxomatchResult<Arc<ContextHierarchy>> {
        self.taxonomy.contexts()
    }

    pub fn taxon_by_ott_id(&self, ott_id: OttId) -> TaxomatchResult<Option<TaxonLookup>> {
        self.taxonomy.taxon_by_ott_id(ott_id)
    }

    pub fn clear_caches(&self) {
        self.caches.clear();
    }

    pub fn cached_lookups(&self) -> usize {
        self.caches.len()
    }
}
