//! Name resolution results

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use taxomatch_core::{NodeId, Nomenclature, OttId, Rank, TaxomatchResult, TaxonFlag};
use taxomatch_taxonomy::{DeprecatedTaxon, Taxon};

pub const PERFECT_SCORE: f64 = 1.0;

/// One candidate taxon for a query name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TnrsMatch {
    /// The cleaned query string that produced this match
    pub search_string: String,
    /// Name or synonym the query matched
    pub matched_name: String,
    pub ott_id: OttId,
    pub node: NodeId,
    pub unique_name: String,
    pub rank: Rank,
    pub is_higher: bool,
    pub nomenclature: Nomenclature,
    pub flags: Vec<TaxonFlag>,
    pub is_approximate: bool,
    pub is_synonym: bool,
    pub is_homonym: bool,
    pub is_deprecated: bool,
    pub is_dubious: bool,
    /// False when the synonym/homonym status of the match could not be determined
    pub name_status_known: bool,
    pub score: f64,
    /// Taxonomy the matched taxon belongs to
    pub source: String,
}

impl TnrsMatch {
    /// An exact match to a current taxon name
    pub fn exact(search_string: &str, taxon: &Taxon, source: &str) -> Self {
        Self {
            search_string: search_string.to_string(),
            matched_name: taxon.name.clone(),
            ott_id: taxon.ott_id,
            node: taxon.node,
            unique_name: taxon.unique_name.clone(),
            rank: taxon.rank.clone(),
            is_higher: taxon.is_higher(),
            nomenclature: taxon.nomenclature,
            flags: taxon.flags.clone(),
            is_approximate: false,
            is_synonym: false,
            is_homonym: false,
            is_deprecated: false,
            is_dubious: taxon.dubious,
            name_status_known: true,
            score: PERFECT_SCORE,
            source: source.to_string(),
        }
    }

    /// A match to a retired ott id; its name status is unknown
    pub fn deprecated(search_string: &str, taxon: &DeprecatedTaxon, source: &str) -> Self {
        Self {
            search_string: search_string.to_string(),
            matched_name: taxon.name.clone(),
            ott_id: taxon.ott_id,
            node: taxon.node,
            unique_name: taxon.name.clone(),
            rank: Rank::Unranked,
            is_higher: false,
            nomenclature: Nomenclature::Undefined,
            flags: Vec::new(),
            is_approximate: false,
            is_synonym: false,
            is_homonym: false,
            is_deprecated: true,
            is_dubious: false,
            name_status_known: false,
            score: PERFECT_SCORE,
            source: source.to_string(),
        }
    }

    pub fn synonym(mut self, matched_name: impl Into<String>) -> Self {
        self.matched_name = matched_name.into();
        self.is_synonym = true;
        self
    }

    pub fn homonym(mut self, is_homonym: bool) -> Self {
        self.is_homonym = is_homonym;
        self
    }

    pub fn approximate(mut self, score: f64) -> Self {
        self.is_approximate = true;
        self.score = score;
        self
    }

    pub fn scored(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Exact, to an accepted name, not shared with another taxon, at full score
    pub fn is_perfect_match(&self) -> bool {
        !self.is_approximate
            && !self.is_synonym
            && !self.is_homonym
            && !self.is_deprecated
            && self.score >= PERFECT_SCORE
    }

    pub fn match_description(&self) -> String {
        if self.is_perfect_match() {
            return "unambiguous match to known taxon".to_string();
        }

        let mut description = if self.is_approximate {
            String::from("approximate match")
        } else {
            String::from("exact match")
        };

        if !self.name_status_known {
            description.push_str("; name status unknown");
            return description;
        }

        if self.is_synonym {
            description.push_str(" to known synonym");
        } else {
            description.push_str(" to known taxon");
        }
        if self.is_homonym {
            description.push_str("; also a homonym");
        }
        description
    }
}

/// All matches found for one query name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TnrsNameResult {
    pub id: String,
    /// The name as submitted
    pub name: String,
    pub matches: Vec<TnrsMatch>,
}

impl TnrsNameResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            matches: Vec::new(),
        }
    }

    /// Add matches, skipping any taxon already matched the same way
    pub fn merge(&mut self, matches: impl IntoIterator<Item = TnrsMatch>) {
        for candidate in matches {
            let duplicate = self.matches.iter().any(|m| {
                m.node == candidate.node
                    && m.is_synonym == candidate.is_synonym
                    && m.is_approximate == candidate.is_approximate
            });
            if !duplicate {
                self.matches.push(candidate);
            }
        }
    }

    /// Highest scoring match; the first one wins ties
    pub fn best_match(&self) -> Option<&TnrsMatch> {
        self.matches
            .iter()
            .fold(None, |best: Option<&TnrsMatch>, m| match best {
                Some(b) if b.score >= m.score => Some(b),
                _ => Some(m),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Order matches by descending score, keeping discovery order among equals
    pub fn sort_matches(&mut self) {
        self.matches
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    }
}

/// Outcome of resolving one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TnrsResults {
    pub context_name: String,
    pub governing_code: Nomenclature,
    pub includes_dubious: bool,
    pub includes_deprecated: bool,
    pub includes_approximate_matches: bool,
    /// Per-name results in request order; unmatched names have none
    pub results: Vec<TnrsNameResult>,
    /// Names without any match, keyed by caller id
    pub unmatched: IndexMap<String, String>,
    /// Ids with an exact match to an accepted taxon name
    pub direct_match_ids: IndexSet<String>,
    pub matched_ott_ids: BTreeSet<OttId>,
    /// Metadata of the taxonomy the names were resolved against
    pub taxonomy: IndexMap<String, String>,
}

impl TnrsResults {
    pub fn result(&self, id: &str) -> Option<&TnrsNameResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn is_matched(&self, id: &str) -> bool {
        self.result(id).map(|r| !r.is_empty()).unwrap_or(false)
    }

    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_empty()).count()
    }

    pub fn to_json(&self) -> TaxomatchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
