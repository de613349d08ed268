/// Taxonomic ranks as they appear in taxonomy records
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Rank {
    Domain,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    Subspecies,
    Variety,
    Varietas,
    Forma,
    Form,
    /// Empty or missing rank
    Unranked,
    /// Any other rank label, kept lowercased
    Other(String),
}

impl Rank {
    /// Parse a rank label; unknown labels are preserved
    pub fn parse(s: &str) -> Self {
        let label = s.trim().to_lowercase();
        match label.as_str() {
            "" => Self::Unranked,
            "domain" | "superkingdom" => Self::Domain,
            "kingdom" => Self::Kingdom,
            "phylum" => Self::Phylum,
            "class" => Self::Class,
            "order" => Self::Order,
            "family" => Self::Family,
            "genus" => Self::Genus,
            "species" => Self::Species,
            "subspecies" => Self::Subspecies,
            "variety" => Self::Variety,
            "varietas" => Self::Varietas,
            "forma" => Self::Forma,
            "form" => Self::Form,
            _ => Self::Other(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Domain => "domain",
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
            Self::Subspecies => "subspecies",
            Self::Variety => "variety",
            Self::Varietas => "varietas",
            Self::Forma => "forma",
            Self::Form => "form",
            Self::Unranked => "",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Species and infraspecific ranks
    pub fn is_specific(&self) -> bool {
        matches!(
            self,
            Self::Species | Self::Subspecies | Self::Variety | Self::Varietas | Self::Forma | Self::Form
        )
    }

    pub fn is_genus(&self) -> bool {
        matches!(self, Self::Genus)
    }

    /// Everything above species level, genus included
    pub fn is_higher(&self) -> bool {
        !self.is_specific()
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::Unranked
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Rank {
    fn from(s: String) -> Self {
        Rank::parse(&s)
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.as_str().to_string()
    }
}
