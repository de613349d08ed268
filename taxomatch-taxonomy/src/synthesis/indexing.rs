//! Name index population for a single taxon

use taxomatch_core::{NodeId, Rank, TaxomatchResult};
use taxomatch_storage::{BatchWriter, IndexScope, NodeIndexKind};

/// Index entries a taxon contributes, as (full index kind, key)
pub fn index_entries(name: &str, rank: &Rank, synonyms: &[String]) -> Vec<(NodeIndexKind, String)> {
    let mut entries = vec![
        (NodeIndexKind::TaxonByName, name.to_string()),
        (NodeIndexKind::TaxonByNameOrSynonym, name.to_string()),
    ];

    if *rank != Rank::Unranked {
        entries.push((NodeIndexKind::TaxonByRank, rank.as_str().to_string()));
    }

    if rank.is_specific() {
        entries.push((NodeIndexKind::TaxonByNameSpecies, name.to_string()));
    } else {
        if rank.is_genus() {
            entries.push((NodeIndexKind::TaxonByNameGenera, name.to_string()));
        }
        entries.push((NodeIndexKind::TaxonByNameHigher, name.to_string()));
        entries.push((NodeIndexKind::TaxonByNameOrSynonymHigher, name.to_string()));
    }

    for synonym in synonyms {
        entries.push((NodeIndexKind::TaxonBySynonym, synonym.clone()));
        entries.push((NodeIndexKind::TaxonByNameOrSynonym, synonym.clone()));
        if !rank.is_specific() {
            entries.push((NodeIndexKind::TaxonByNameOrSynonymHigher, synonym.clone()));
        }
    }
    entries
}

/// Writes a taxon's entries into the indexes carrying one context suffix
#[derive(Debug, Clone)]
pub struct IndexPopulator {
    suffix: String,
}

impl IndexPopulator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self { suffix: suffix.into() }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn add(
        &self,
        writer: &mut BatchWriter<'_>,
        node: NodeId,
        name: &str,
        rank: &Rank,
        synonyms: &[String],
        scope: IndexScope,
    ) -> TaxomatchResult<usize> {
        let entries = index_entries(name, rank, synonyms);
        for (kind, key) in &entries {
            writer.index_add(&kind.in_scope(scope).index_name(&self.suffix), key.as_str(), node)?;
        }
        Ok(entries.len())
    }

    /// Empty every per-taxon index of this suffix in both scopes
    pub fn clear(&self, writer: &mut BatchWriter<'_>) -> TaxomatchResult<()> {
        for kind in NodeIndexKind::CONTEXT_KINDS {
            writer.clear_index(&kind.index_name(&self.suffix))?;
            writer.clear_index(&kind.preferred().index_name(&self.suffix))?;
        }
        Ok(())
    }
}
