//! Named node indexes
//!
//! Every index kind has a base name. Context-specific copies append the context's index
//! suffix, so the all-life context (empty suffix) uses the bare base names.

use serde::{Deserialize, Serialize};

use crate::core::IndexName;

/// Which taxa an index admits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexScope {
    /// Every taxon, suppressed or not
    Full,
    /// Taxa reachable through preferred edges and not suppressed
    Preferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeIndexKind {
    TaxonByName,
    TaxonByNameSpecies,
    TaxonByNameGenera,
    TaxonByNameHigher,
    TaxonBySynonym,
    TaxonByNameOrSynonym,
    TaxonByNameOrSynonymHigher,
    TaxonByRank,
    TaxonByOttId,
    TaxonByFlag,
    SpeciesByGenus,
    DeprecatedTaxa,

    PreferredTaxonByName,
    PreferredTaxonByNameSpecies,
    PreferredTaxonByNameGenera,
    PreferredTaxonByNameHigher,
    PreferredTaxonBySynonym,
    PreferredTaxonByNameOrSynonym,
    PreferredTaxonByNameOrSynonymHigher,
    PreferredTaxonByRank,
    PreferredSpeciesByGenus,
}

impl NodeIndexKind {
    /// Kinds populated per taxon and per context, in full/preferred pairs
    pub const CONTEXT_KINDS: [NodeIndexKind; 8] = [
        NodeIndexKind::TaxonByName,
        NodeIndexKind::TaxonByNameSpecies,
        NodeIndexKind::TaxonByNameGenera,
        NodeIndexKind::TaxonByNameHigher,
        NodeIndexKind::TaxonBySynonym,
        NodeIndexKind::TaxonByNameOrSynonym,
        NodeIndexKind::TaxonByNameOrSynonymHigher,
        NodeIndexKind::TaxonByRank,
    ];

    pub fn base_name(&self) -> &'static str {
        match self {
            NodeIndexKind::TaxonByName => "taxNodesByName",
            NodeIndexKind::TaxonByNameSpecies => "taxNodesByNameSpecies",
            NodeIndexKind::TaxonByNameGenera => "taxNodesByNameGenera",
            NodeIndexKind::TaxonByNameHigher => "taxNodesByNameHigher",
            NodeIndexKind::TaxonBySynonym => "taxNodesBySyn",
            NodeIndexKind::TaxonByNameOrSynonym => "taxNodesByNameOrSyn",
            NodeIndexKind::TaxonByNameOrSynonymHigher => "taxNodesByNameOrSynHigher",
            NodeIndexKind::TaxonByRank => "taxNodesByRank",
            NodeIndexKind::TaxonByOttId => "taxNodesByOTTId",
            NodeIndexKind::TaxonByFlag => "taxNodesByFlag",
            NodeIndexKind::SpeciesByGenus => "speciesNodesByGenus",
            NodeIndexKind::DeprecatedTaxa => "deprecatedTaxa",
            NodeIndexKind::PreferredTaxonByName => "prefTaxNodesByName",
            NodeIndexKind::PreferredTaxonByNameSpecies => "prefTaxNodesByNameSpecies",
            NodeIndexKind::PreferredTaxonByNameGenera => "prefTaxNodesByNameGenera",
            NodeIndexKind::PreferredTaxonByNameHigher => "prefTaxNodesByNameHigher",
            NodeIndexKind::PreferredTaxonBySynonym => "prefTaxNodesBySyn",
            NodeIndexKind::PreferredTaxonByNameOrSynonym => "prefTaxNodesByNameOrSyn",
            NodeIndexKind::PreferredTaxonByNameOrSynonymHigher => "prefTaxNodesByNameOrSynHigher",
            NodeIndexKind::PreferredTaxonByRank => "prefTaxNodesByRank",
            NodeIndexKind::PreferredSpeciesByGenus => "prefSpeciesNodesByGenus",
        }
    }

    pub fn scope(&self) -> IndexScope {
        match self {
            NodeIndexKind::PreferredTaxonByName
            | NodeIndexKind::PreferredTaxonByNameSpecies
            | NodeIndexKind::PreferredTaxonByNameGenera
            | NodeIndexKind::PreferredTaxonByNameHigher
            | NodeIndexKind::PreferredTaxonBySynonym
            | NodeIndexKind::PreferredTaxonByNameOrSynonym
            | NodeIndexKind::PreferredTaxonByNameOrSynonymHigher
            | NodeIndexKind::PreferredTaxonByRank
            | NodeIndexKind::PreferredSpeciesByGenus => IndexScope::Preferred,
            _ => IndexScope::Full,
        }
    }

    /// The preferred counterpart of a full index; kinds without one map to themselves
    pub fn preferred(self) -> NodeIndexKind {
        match self {
            NodeIndexKind::TaxonByName => NodeIndexKind::PreferredTaxonByName,
            NodeIndexKind::TaxonByNameSpecies => NodeIndexKind::PreferredTaxonByNameSpecies,
            NodeIndexKind::TaxonByNameGenera => NodeIndexKind::PreferredTaxonByNameGenera,
            NodeIndexKind::TaxonByNameHigher => NodeIndexKind::PreferredTaxonByNameHigher,
            NodeIndexKind::TaxonBySynonym => NodeIndexKind::PreferredTaxonBySynonym,
            NodeIndexKind::TaxonByNameOrSynonym => NodeIndexKind::PreferredTaxonByNameOrSynonym,
            NodeIndexKind::TaxonByNameOrSynonymHigher => {
                NodeIndexKind::PreferredTaxonByNameOrSynonymHigher
            }
            NodeIndexKind::TaxonByRank => NodeIndexKind::PreferredTaxonByRank,
            NodeIndexKind::SpeciesByGenus => NodeIndexKind::PreferredSpeciesByGenus,
            other => other,
        }
    }

    /// The full counterpart of a preferred index; kinds without one map to themselves
    pub fn full(self) -> NodeIndexKind {
        match self {
            NodeIndexKind::PreferredTaxonByName => NodeIndexKind::TaxonByName,
            NodeIndexKind::PreferredTaxonByNameSpecies => NodeIndexKind::TaxonByNameSpecies,
            NodeIndexKind::PreferredTaxonByNameGenera => NodeIndexKind::TaxonByNameGenera,
            NodeIndexKind::PreferredTaxonByNameHigher => NodeIndexKind::TaxonByNameHigher,
            NodeIndexKind::PreferredTaxonBySynonym => NodeIndexKind::TaxonBySynonym,
            NodeIndexKind::PreferredTaxonByNameOrSynonym => NodeIndexKind::TaxonByNameOrSynonym,
            NodeIndexKind::PreferredTaxonByNameOrSynonymHigher => {
                NodeIndexKind::TaxonByNameOrSynonymHigher
            }
            NodeIndexKind::PreferredTaxonByRank => NodeIndexKind::TaxonByRank,
            NodeIndexKind::PreferredSpeciesByGenus => NodeIndexKind::SpeciesByGenus,
            other => other,
        }
    }

    /// Switch between variants, e.g. to include suppressed taxa in a search
    pub fn in_scope(self, scope: IndexScope) -> NodeIndexKind {
        match scope {
            IndexScope::Full => self.full(),
            IndexScope::Preferred => self.preferred(),
        }
    }

    /// Store name of this index for a context with the given suffix
    pub fn index_name(&self, suffix: &str) -> IndexName {
        IndexName::new(format!("{}{}", self.base_name(), suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_names_carry_suffix() {
        assert_eq!(
            NodeIndexKind::PreferredTaxonByName.index_name("").as_str(),
            "prefTaxNodesByName"
        );
        assert_eq!(
            NodeIndexKind::TaxonByName.index_name("Mammals").as_str(),
            "taxNodesByNameMammals"
        );
    }

    #[test]
    fn test_scope_switching_round_trips() {
        for kind in NodeIndexKind::CONTEXT_KINDS {
            assert_eq!(kind.scope(), IndexScope::Full);
            assert_eq!(kind.preferred().scope(), IndexScope::Preferred);
            assert_eq!(kind.preferred().full(), kind);
            assert_eq!(kind.in_scope(IndexScope::Full), kind);
        }
        assert_eq!(
            NodeIndexKind::TaxonByOttId.preferred(),
            NodeIndexKind::TaxonByOttId
        );
    }
}
