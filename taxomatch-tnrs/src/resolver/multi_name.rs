//! Batch resolution of names with context inference
//!
//! Names that hit exactly one taxon anywhere anchor the batch. The LICA of the anchors picks
//! the context the remaining names are searched in, and approximate matches far from that
//! LICA are discounted.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use taxomatch_core::config::TnrsConfig;
use taxomatch_core::{NodeId, TaxomatchResult};
use taxomatch_storage::{IndexName, IndexScope, NodeIndexKind};
use taxomatch_taxonomy::{DeprecatedTaxon, Taxon, Taxonomy, TaxonomyContext};

use super::scoring::{distance_modifier, edit_score, min_similarity};
use crate::request::{NameQuery, TnrsRequest};
use crate::results::{TnrsMatch, TnrsNameResult, TnrsResults};
use crate::scrubber::scrub_name;

/// Context chosen for a set of names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextInference {
    pub context: TaxonomyContext,
    /// Names that did not anchor the inference
    pub unmatched_names: Vec<String>,
}

/// Per-batch bookkeeping
struct BatchState {
    results: IndexMap<String, TnrsNameResult>,
    direct_match_ids: IndexSet<String>,
    anchors: Vec<NodeId>,
}

impl BatchState {
    fn new() -> Self {
        Self {
            results: IndexMap::new(),
            direct_match_ids: IndexSet::new(),
            anchors: Vec::new(),
        }
    }

    fn add(&mut self, query: &NameQuery, matches: Vec<TnrsMatch>) {
        if matches.is_empty() {
            return;
        }
        self.results
            .entry(query.id.clone())
            .or_insert_with(|| TnrsNameResult::new(query.id.clone(), query.original.clone()))
            .merge(matches);
    }

    fn is_matched(&self, query: &NameQuery) -> bool {
        self.results.get(&query.id).map(|r| !r.is_empty()).unwrap_or(false)
    }

    fn anchor(&mut self, node: NodeId) {
        if !self.anchors.contains(&node) {
            self.anchors.push(node);
        }
    }
}

pub struct MultiNameResolver<'a> {
    taxonomy: &'a Taxonomy,
    config: &'a TnrsConfig,
}

impl<'a> MultiNameResolver<'a> {
    pub fn new(taxonomy: &'a Taxonomy, config: &'a TnrsConfig) -> Self {
        Self { taxonomy, config }
    }

    /// Pick the least inclusive context holding every unambiguous name
    pub fn infer_context(&self, names: &[String]) -> TaxomatchResult<ContextInference> {
        let hierarchy = self.taxonomy.contexts()?;
        let index = hierarchy.life().index(NodeIndexKind::PreferredTaxonByName);

        let mut anchors = Vec::new();
        let mut unmatched_names = Vec::new();
        for name in names {
            let hits = self.lookup(&index, &scrub_name(name))?;
            match hits.as_slice() {
                [node] if self.taxonomy.is_placed(*node)? => anchors.push(*node),
                _ => unmatched_names.push(name.clone()),
            }
        }

        let lica = self.lica_or(&anchors, hierarchy.life().root)?;
        let context = self.taxonomy.home_context(lica)?;
        info!(
            "Inferred context '{}' from {} of {} names",
            context.name(),
            anchors.len(),
            names.len()
        );

        Ok(ContextInference {
            context,
            unmatched_names,
        })
    }

    pub fn resolve(&self, request: &TnrsRequest) -> TaxomatchResult<TnrsResults> {
        let queries = request.validate(self.config)?;
        let hierarchy = self.taxonomy.contexts()?;
        let scope = if request.include_dubious {
            IndexScope::Full
        } else {
            IndexScope::Preferred
        };
        let mut state = BatchState::new();

        let context = match &request.context {
            Some(name) => hierarchy.get(name)?.clone(),
            None => {
                let index = hierarchy.life().index(NodeIndexKind::TaxonByName.in_scope(scope));
                self.match_anchors(&queries, &index, &mut state)?;
                let lica = self.lica_or(&state.anchors, hierarchy.life().root)?;
                self.taxonomy.home_context(lica)?
            }
        };
        debug!(
            "Resolving {} names in context '{}' ({} anchors)",
            queries.len(),
            context.name(),
            state.anchors.len()
        );

        for query in &queries {
            if !state.is_matched(query) {
                self.match_exact(query, request, &context, scope, &mut state)?;
            }
        }
        let lica = self.lica_or(&state.anchors, context.root)?;

        let synonym_index = context.index(NodeIndexKind::TaxonBySynonym.in_scope(scope));
        for query in &queries {
            let matches = self.match_synonyms(query, &synonym_index)?;
            state.add(query, matches);
        }

        if request.fuzzy {
            for query in &queries {
                if !state.is_matched(query) {
                    let matches = self.match_fuzzy(query, request, &context, scope, lica)?;
                    state.add(query, matches);
                }
            }
        }

        self.finish(queries, request, &context, state)
    }

    /// Names with exactly one hit among all taxa
    fn match_anchors(
        &self,
        queries: &[NameQuery],
        index: &IndexName,
        state: &mut BatchState,
    ) -> TaxomatchResult<()> {
        for query in queries {
            let hits = self.lookup(index, &query.scrubbed)?;
            let [node] = hits.as_slice() else {
                continue;
            };
            let Some(taxon) = self.taxonomy.taxon(*node)? else {
                continue;
            };
            state.add(query, vec![self.exact_match(query, &taxon)]);
            state.direct_match_ids.insert(query.id.clone());
            self.anchor_if_placed(&taxon, state)?;
        }
        Ok(())
    }

    /// Suppressed or detached taxa have no preferred path to life and cannot place a LICA
    fn anchor_if_placed(&self, taxon: &Taxon, state: &mut BatchState) -> TaxomatchResult<()> {
        if !taxon.dubious && self.taxonomy.is_placed(taxon.node)? {
            state.anchor(taxon.node);
        }
        Ok(())
    }

    fn match_exact(
        &self,
        query: &NameQuery,
        request: &TnrsRequest,
        context: &TaxonomyContext,
        scope: IndexScope,
        state: &mut BatchState,
    ) -> TaxomatchResult<()> {
        let mut hits = self.lookup(&context.index(NodeIndexKind::TaxonByName.in_scope(scope)), &query.scrubbed)?;
        let mut genus_only = false;
        if hits.is_empty() && request.match_sp_to_genus {
            if let Some(genus) = query.sp_genus() {
                hits = self.lookup(&context.index(NodeIndexKind::TaxonByNameGenera.in_scope(scope)), genus)?;
                genus_only = true;
            }
        }

        // Only an unambiguous name anchors the batch or counts as a direct match
        let is_homonym = hits.len() > 1;
        let is_direct = !genus_only && !is_homonym;
        let mut matches = Vec::with_capacity(hits.len());
        for node in hits {
            let Some(taxon) = self.taxonomy.taxon(node)? else {
                continue;
            };
            let m = self.exact_match(query, &taxon).homonym(is_homonym);
            if genus_only {
                matches.push(m.scored(self.config.genus_only_score));
            } else {
                if is_direct {
                    self.anchor_if_placed(&taxon, state)?;
                }
                matches.push(m);
            }
        }
        let mut has_direct = is_direct && !matches.is_empty();

        if request.include_deprecated {
            let index = NodeIndexKind::DeprecatedTaxa.index_name("");
            for node in self.lookup(&index, &query.scrubbed)? {
                if let Some(deprecated) = DeprecatedTaxon::load(self.taxonomy.store(), node)? {
                    matches.push(TnrsMatch::deprecated(&query.scrubbed, &deprecated, &self.config.taxonomy_name));
                    has_direct = true;
                }
            }
        }

        if has_direct {
            state.direct_match_ids.insert(query.id.clone());
        }
        state.add(query, matches);
        Ok(())
    }

    fn match_synonyms(&self, query: &NameQuery, index: &IndexName) -> TaxomatchResult<Vec<TnrsMatch>> {
        let hits = self.lookup(index, &query.scrubbed)?;

        // A synonym shared by several taxa is not reported as a homonym
        let mut matches = Vec::with_capacity(hits.len());
        for node in hits {
            let Some(taxon) = self.taxonomy.taxon(node)? else {
                continue;
            };
            let synonym = self.synonym_spelling(&taxon, &query.scrubbed)?;
            matches.push(self.exact_match(query, &taxon).synonym(synonym).homonym(false));
        }
        Ok(matches)
    }

    fn match_fuzzy(
        &self,
        query: &NameQuery,
        request: &TnrsRequest,
        context: &TaxonomyContext,
        scope: IndexScope,
        lica: NodeId,
    ) -> TaxomatchResult<Vec<TnrsMatch>> {
        let key = query.scrubbed.to_lowercase();
        let threshold = min_similarity(key.chars().count());
        if key.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.taxonomy.store();
        let index = context.index(NodeIndexKind::TaxonByNameOrSynonym.in_scope(scope));
        let hits = store.fuzzy_lookup(&index, &key, threshold)?;

        let mut nodes_per_key: HashMap<&str, usize> = HashMap::new();
        for hit in &hits {
            *nodes_per_key.entry(hit.key.as_str()).or_default() += 1;
        }

        let mut matches = Vec::new();
        for hit in &hits {
            let Some(taxon) = self.taxonomy.taxon(hit.node)? else {
                continue;
            };
            let score = edit_score(&key, &hit.key, hit.distance) * self.lica_modifier(lica, hit.node)?;
            if score < self.config.min_score {
                continue;
            }

            let mut m = self
                .exact_match(query, &taxon)
                .approximate(score)
                .homonym(nodes_per_key.get(hit.key.as_str()).copied().unwrap_or(0) > 1);
            if hit.key != taxon.name.to_lowercase() {
                m = m.synonym(self.synonym_spelling(&taxon, &hit.key)?);
            }
            matches.push(m);
        }

        if request.include_deprecated {
            let index = NodeIndexKind::DeprecatedTaxa.index_name("");
            for hit in store.fuzzy_lookup(&index, &key, threshold)? {
                let score = edit_score(&key, &hit.key, hit.distance);
                if score < self.config.min_score {
                    continue;
                }
                if let Some(deprecated) = DeprecatedTaxon::load(store, hit.node)? {
                    matches.push(
                        TnrsMatch::deprecated(&query.scrubbed, &deprecated, &self.config.taxonomy_name)
                            .approximate(score),
                    );
                }
            }
        }

        debug!("'{}': {} approximate matches", query.scrubbed, matches.len());
        Ok(matches)
    }

    fn finish(
        &self,
        queries: Vec<NameQuery>,
        request: &TnrsRequest,
        context: &TaxonomyContext,
        mut state: BatchState,
    ) -> TaxomatchResult<TnrsResults> {
        let mut results = Vec::with_capacity(state.results.len());
        let mut unmatched = IndexMap::new();
        for query in queries {
            match state.results.shift_remove(&query.id) {
                Some(mut result) if !result.is_empty() => {
                    result.sort_matches();
                    results.push(result);
                }
                _ => {
                    unmatched.insert(query.id, query.original);
                }
            }
        }

        let matched_ott_ids: BTreeSet<_> = results
            .iter()
            .flat_map(|r| r.matches.iter().map(|m| m.ott_id))
            .collect();
        let includes_approximate_matches = results
            .iter()
            .any(|r| r.matches.iter().any(|m| m.is_approximate));

        info!(
            "Matched {} of {} names in '{}' ({} direct, {} unmatched)",
            results.len(),
            results.len() + unmatched.len(),
            context.name(),
            state.direct_match_ids.len(),
            unmatched.len()
        );

        Ok(TnrsResults {
            context_name: context.name().to_string(),
            governing_code: context.nomenclature(),
            includes_dubious: request.include_dubious,
            includes_deprecated: request.include_deprecated,
            includes_approximate_matches,
            results,
            unmatched,
            direct_match_ids: state.direct_match_ids,
            matched_ott_ids,
            taxonomy: self.taxonomy.metadata()?,
        })
    }

    fn exact_match(&self, query: &NameQuery, taxon: &Taxon) -> TnrsMatch {
        TnrsMatch::exact(&query.scrubbed, taxon, &self.config.taxonomy_name)
    }

    fn lookup(&self, index: &IndexName, name: &str) -> TaxomatchResult<Vec<NodeId>> {
        if name.is_empty() {
            return Ok(Vec::new());
        }
        self.taxonomy.store().exact_lookup(index, name)
    }

    fn lica_or(&self, anchors: &[NodeId], fallback: NodeId) -> TaxomatchResult<NodeId> {
        if anchors.is_empty() {
            Ok(fallback)
        } else {
            self.taxonomy.compute_lica(anchors)
        }
    }

    /// Matches outside the LICA's subtree lose score with internodal distance.
    /// Taxa with no preferred path to life have no distance and keep their score.
    fn lica_modifier(&self, lica: NodeId, node: NodeId) -> TaxomatchResult<f64> {
        if self.taxonomy.is_descendant(lica, node)? || !self.taxonomy.is_placed(node)? {
            return Ok(1.0);
        }
        Ok(distance_modifier(self.taxonomy.internodal_distance(lica, node)?))
    }

    /// The stored spelling of a synonym matched through its lowercased key
    fn synonym_spelling(&self, taxon: &Taxon, key: &str) -> TaxomatchResult<String> {
        let key = key.to_lowercase();
        Ok(taxon
            .synonyms(self.taxonomy.store())?
            .into_iter()
            .find(|s| s.to_lowercase() == key)
            .unwrap_or(key))
    }
}
