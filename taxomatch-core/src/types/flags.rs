//! Taxon quality flags
//!
//! Flags arrive as free-form labels on taxonomy records. Each recognised label maps to a
//! [`TaxonFlag`] whose `suppresses()` entry decides whether a flagged taxon is kept out of the
//! preferred indexes. `forced_visible` overrides suppression seen earlier in the same record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonFlag {
    NotOtu,
    Barren,
    Environmental,
    EnvironmentalInherited,
    Extinct,
    ExtinctDirect,
    ExtinctInherited,
    MajorRankConflict,
    MajorRankConflictDirect,
    MajorRankConflictInherited,
    Unclassified,
    UnclassifiedDirect,
    UnclassifiedInherited,
    Viral,
    Hidden,
    HiddenInherited,
    Edited,
    Hybrid,
    IncertaeSedis,
    IncertaeSedisInherited,
    IncertaeSedisDirect,
    Infraspecific,
    SiblingLower,
    SiblingHigher,
    Tattered,
    TatteredInherited,
    ForcedVisible,
}

/// (flag, label, suppresses)
const FLAG_TABLE: &[(TaxonFlag, &str, bool)] = &[
    (TaxonFlag::NotOtu, "not_otu", true),
    (TaxonFlag::Barren, "barren", true),
    (TaxonFlag::Environmental, "environmental", true),
    (TaxonFlag::EnvironmentalInherited, "environmental_inherited", true),
    (TaxonFlag::Extinct, "extinct", false),
    (TaxonFlag::ExtinctDirect, "extinct_direct", false),
    (TaxonFlag::ExtinctInherited, "extinct_inherited", false),
    (TaxonFlag::MajorRankConflict, "major_rank_conflict", false),
    (TaxonFlag::MajorRankConflictDirect, "major_rank_conflict_direct", false),
    (TaxonFlag::MajorRankConflictInherited, "major_rank_conflict_inherited", false),
    (TaxonFlag::Unclassified, "unclassified", true),
    (TaxonFlag::UnclassifiedDirect, "unclassified_direct", true),
    (TaxonFlag::UnclassifiedInherited, "unclassified_inherited", true),
    (TaxonFlag::Viral, "viral", true),
    (TaxonFlag::Hidden, "hidden", true),
    (TaxonFlag::HiddenInherited, "hidden_inherited", true),
    (TaxonFlag::Edited, "edited", false),
    (TaxonFlag::Hybrid, "hybrid", false),
    (TaxonFlag::IncertaeSedis, "incertae_sedis", true),
    (TaxonFlag::IncertaeSedisInherited, "incertae_sedis_inherited", true),
    (TaxonFlag::IncertaeSedisDirect, "incertae_sedis_direct", true),
    (TaxonFlag::Infraspecific, "infraspecific", false),
    (TaxonFlag::SiblingLower, "sibling_lower", false),
    (TaxonFlag::SiblingHigher, "sibling_higher", false),
    (TaxonFlag::Tattered, "tattered", false),
    (TaxonFlag::TatteredInherited, "tattered_inherited", false),
    (TaxonFlag::ForcedVisible, "forced_visible", false),
];

impl TaxonFlag {
    // Table rows follow declaration order
    fn entry(&self) -> &'static (TaxonFlag, &'static str, bool) {
        &FLAG_TABLE[*self as usize]
    }

    pub fn label(&self) -> &'static str {
        self.entry().1
    }

    /// Whether this flag keeps a taxon out of the preferred indexes
    pub fn suppresses(&self) -> bool {
        self.entry().2
    }

    pub fn is_force_visible(&self) -> bool {
        matches!(self, TaxonFlag::ForcedVisible)
    }

    pub fn all() -> impl Iterator<Item = TaxonFlag> {
        FLAG_TABLE.iter().map(|(flag, _, _)| *flag)
    }
}

impl fmt::Display for TaxonFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaxonFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        FLAG_TABLE
            .iter()
            .find(|(_, l, _)| *l == label)
            .map(|(flag, _, _)| *flag)
            .ok_or_else(|| format!("unrecognized taxon flag '{}'", label))
    }
}

/// Outcome of folding a record's flag labels in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagEvaluation {
    pub flags: Vec<TaxonFlag>,
    pub unrecognized: Vec<String>,
    pub dubious: bool,
    pub force_visible: bool,
}

/// Walk flag labels in record order and derive the dubious bit.
///
/// A suppressing flag marks the taxon dubious unless `forced_visible` has already been seen;
/// `forced_visible` clears any dubious state accumulated before it.
pub fn evaluate_flags<'a, I>(labels: I) -> FlagEvaluation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut eval = FlagEvaluation::default();

    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }

        match label.parse::<TaxonFlag>() {
            Ok(flag) => {
                if flag.is_force_visible() {
                    eval.force_visible = true;
                    eval.dubious = false;
                }
                if flag.suppresses() && !eval.force_visible {
                    eval.dubious = true;
                }
                eval.flags.push(flag);
            }
            Err(_) => eval.unrecognized.push(label.to_string()),
        }
    }

    eval
}
