//! Single-name resolution for autocomplete boxes
//!
//! Stages run from most to least specific and the first stage with any result wins. A query
//! containing a space is treated as a binomial whose epithet may be incomplete; once its first
//! word names a genus, that genus's species are the whole answer.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use taxomatch_core::config::TnrsConfig;
use taxomatch_core::{NodeId, Nomenclature, OttId, TaxomatchResult};
use taxomatch_storage::{IndexScope, LookupCache, NodeIndexKind, TaxonStore};
use taxomatch_taxonomy::{species_in_genus, Taxon, TaxonomyContext};

use super::scoring::min_similarity;
use crate::scrubber::scrub_name;

/// One autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteMatch {
    pub ott_id: OttId,
    pub unique_name: String,
    pub is_higher: bool,
    pub is_suppressed: bool,
    pub is_homonym: bool,
    pub nomenclature: Nomenclature,
}

impl AutocompleteMatch {
    fn new(taxon: &Taxon, is_homonym: bool) -> Self {
        Self {
            ott_id: taxon.ott_id,
            unique_name: taxon.unique_name.clone(),
            is_higher: taxon.is_higher(),
            is_suppressed: taxon.dubious,
            is_homonym,
            nomenclature: taxon.nomenclature,
        }
    }
}

/// Higher taxa first, then by unique name; a name sorts before names it prefixes
pub fn sort_suggestions(matches: &mut [AutocompleteMatch]) {
    matches.sort_by(|a, b| {
        b.is_higher
            .cmp(&a.is_higher)
            .then_with(|| a.unique_name.to_lowercase().cmp(&b.unique_name.to_lowercase()))
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Exact hits from every listed index
    Exact(&'static [NodeIndexKind]),
    Prefix(NodeIndexKind),
    Fuzzy(NodeIndexKind),
    /// Species of an exactly matched genus whose epithet starts with the rest of the query.
    /// Fires whenever the genus exists, even if no epithet matches.
    SpeciesOfGenus,
}

const BINOMIAL_STAGES: [Stage; 5] = [
    Stage::Exact(&[NodeIndexKind::TaxonByNameSpecies, NodeIndexKind::TaxonBySynonym]),
    Stage::SpeciesOfGenus,
    Stage::Exact(&[NodeIndexKind::TaxonByNameHigher]),
    Stage::Prefix(NodeIndexKind::TaxonByNameOrSynonymHigher),
    Stage::Fuzzy(NodeIndexKind::TaxonByNameOrSynonym),
];

const SINGLE_WORD_STAGES: [Stage; 4] = [
    Stage::Exact(&[NodeIndexKind::TaxonByNameOrSynonymHigher]),
    Stage::Prefix(NodeIndexKind::TaxonByNameHigher),
    Stage::Prefix(NodeIndexKind::TaxonBySynonym),
    Stage::Fuzzy(NodeIndexKind::TaxonByNameOrSynonymHigher),
];

/// Memoized lookups shared by every prefix query of a service
#[derive(Clone)]
pub struct PrefixCaches {
    /// Genus ott id to its species as (node, lowercased name)
    species_by_genus: LookupCache<OttId, Vec<(NodeId, String)>>,
    /// (context index suffix, lowercased name) to whether the name is a homonym there
    homonyms: LookupCache<(String, String), bool>,
}

impl PrefixCaches {
    pub fn new(capacity: usize) -> Self {
        Self {
            species_by_genus: LookupCache::new(capacity),
            homonyms: LookupCache::new(capacity),
        }
    }

    pub fn clear(&self) {
        self.species_by_genus.clear();
        self.homonyms.clear();
    }

    pub fn len(&self) -> usize {
        self.species_by_genus.len() + self.homonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct PrefixResolver<'a> {
    store: &'a dyn TaxonStore,
    config: &'a TnrsConfig,
    context: &'a TaxonomyContext,
    scope: IndexScope,
    caches: &'a PrefixCaches,
}

impl<'a> PrefixResolver<'a> {
    pub fn new(
        store: &'a dyn TaxonStore,
        config: &'a TnrsConfig,
        context: &'a TaxonomyContext,
        caches: &'a PrefixCaches,
    ) -> Self {
        Self {
            store,
            config,
            context,
            scope: IndexScope::Preferred,
            caches,
        }
    }

    /// Search the full index variants so suppressed taxa are suggested too
    pub fn include_dubious(mut self, include: bool) -> Self {
        self.scope = if include {
            IndexScope::Full
        } else {
            IndexScope::Preferred
        };
        self
    }

    pub fn search(&self, query: &str) -> TaxomatchResult<Vec<AutocompleteMatch>> {
        let query = scrub_name(query).to_lowercase();
        if query.chars().count() < self.config.min_query_length {
            return Ok(Vec::new());
        }

        let stages: &[Stage] = if query.contains(' ') {
            &BINOMIAL_STAGES
        } else {
            &SINGLE_WORD_STAGES
        };

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for stage in stages {
            if let Some(found) = self.run_stage(*stage, &query, &mut seen)? {
                debug!("'{}' answered by {:?} with {} taxa", query, stage, found.len());
                nodes = found;
                break;
            }
        }

        let mut matches = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(taxon) = Taxon::load(self.store, node)? {
                let is_homonym = self.is_homonym(&taxon.name)?;
                matches.push(AutocompleteMatch::new(&taxon, is_homonym));
            }
        }
        sort_suggestions(&mut matches);
        Ok(matches)
    }

    /// Nodes found by `stage`, or None when the search should move on to the next stage
    fn run_stage(
        &self,
        stage: Stage,
        query: &str,
        seen: &mut HashSet<NodeId>,
    ) -> TaxomatchResult<Option<Vec<NodeId>>> {
        let found = match stage {
            Stage::Exact(kinds) => {
                let mut found = Vec::new();
                for kind in kinds {
                    found.extend(self.store.exact_lookup(&self.index(*kind), query)?);
                }
                found
            }
            Stage::Prefix(kind) => {
                if query.chars().count() < self.config.min_prefix_length {
                    return Ok(None);
                }
                self.store
                    .prefix_lookup(&self.index(kind), query)?
                    .into_iter()
                    .map(|hit| hit.node)
                    .collect()
            }
            Stage::Fuzzy(kind) => self
                .store
                .fuzzy_lookup(&self.index(kind), query, min_similarity(query.chars().count()))?
                .into_iter()
                .map(|hit| hit.node)
                .collect(),
            Stage::SpeciesOfGenus => {
                let Some(species) = self.species_of_genus(query)? else {
                    return Ok(None);
                };
                let species: Vec<NodeId> = species.into_iter().filter(|node| seen.insert(*node)).collect();
                return Ok(Some(species));
            }
        };

        let found: Vec<NodeId> = found.into_iter().filter(|node| seen.insert(*node)).collect();
        Ok(if found.is_empty() { None } else { Some(found) })
    }

    /// Species of the genus named by the first word, filtered by epithet prefix; None when
    /// no genus has that name
    fn species_of_genus(&self, query: &str) -> TaxomatchResult<Option<Vec<NodeId>>> {
        let Some((genus, epithet)) = query.split_once(' ') else {
            return Ok(None);
        };
        let epithet = epithet.trim();

        let genera = self.store.exact_lookup(&self.index(NodeIndexKind::TaxonByNameGenera), genus)?;
        if genera.is_empty() {
            return Ok(None);
        }

        let mut found = Vec::new();
        for node in genera {
            let Some(genus_taxon) = Taxon::load(self.store, node)? else {
                continue;
            };
            let species = self.caches.species_by_genus.get_or_try_insert_with(genus_taxon.ott_id, || {
                let mut species = Vec::new();
                for node in species_in_genus(self.store, &genus_taxon)? {
                    if let Some(taxon) = Taxon::load(self.store, node)? {
                        species.push((node, taxon.name.to_lowercase()));
                    }
                }
                TaxomatchResult::Ok(species)
            })?;

            let stem = format!("{} ", genus_taxon.name.to_lowercase());
            found.extend(
                species
                    .iter()
                    .filter(|(_, name)| {
                        name.strip_prefix(&stem)
                            .map(|rest| rest.starts_with(epithet))
                            .unwrap_or(false)
                    })
                    .map(|(node, _)| *node),
            );
        }
        Ok(Some(found))
    }

    /// More than one taxon carries `name` in the context's preferred-name index
    fn is_homonym(&self, name: &str) -> TaxomatchResult<bool> {
        let key = (self.context.descriptor.index_suffix.clone(), name.to_lowercase());
        self.caches.homonyms.get_or_try_insert_with(key, || {
            let hits = self
                .store
                .exact_lookup(&self.context.index(NodeIndexKind::PreferredTaxonByName), name)?;
            TaxomatchResult::Ok(hits.len() > 1)
        })
    }

    fn index(&self, kind: NodeIndexKind) -> taxomatch_storage::IndexName {
        self.context.index(kind.in_scope(self.scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(name: &str, is_higher: bool) -> AutocompleteMatch {
        AutocompleteMatch {
            ott_id: OttId(1),
            unique_name: name.to_string(),
            is_higher,
            is_suppressed: false,
            is_homonym: false,
            nomenclature: Nomenclature::Undefined,
        }
    }

    #[test]
    fn test_higher_taxa_sort_first() {
        let mut matches = vec![
            suggestion("Pan troglodytes", false),
            suggestion("Pan", true),
            suggestion("Panthera leo", false),
            suggestion("Panthera", true),
        ];
        sort_suggestions(&mut matches);
        let names: Vec<&str> = matches.iter().map(|m| m.unique_name.as_str()).collect();
        assert_eq!(names, vec!["Pan", "Panthera", "Pan troglodytes", "Panthera leo"]);
    }

    #[test]
    fn test_caches_start_empty() {
        let caches = PrefixCaches::new(10);
        assert!(caches.is_empty());
        caches.homonyms.insert(("".to_string(), "aotus".to_string()), true);
        assert_eq!(caches.len(), 1);
        caches.clear();
        assert!(caches.is_empty());
    }
}
