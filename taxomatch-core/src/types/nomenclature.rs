/// Nomenclatural codes governing taxon names
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Nomenclature {
    /// Plants, fungi and some protists
    #[serde(rename = "ICN")]
    Icn,
    /// Bacteria
    #[serde(rename = "ICNP")]
    Icnp,
    /// Animals
    #[serde(rename = "ICZN")]
    Iczn,
    /// Governing code unclear, nonexistent, or multiple codes
    #[default]
    #[serde(rename = "undefined")]
    Undefined,
}

impl Nomenclature {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Icn => "ICN",
            Self::Icnp => "ICNP",
            Self::Iczn => "ICZN",
            Self::Undefined => "undefined",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Icn => "plants, fungi, and some protists",
            Self::Icnp => "bacteria",
            Self::Iczn => "animals",
            Self::Undefined => "governing code unclear, nonexistent, or multiple codes",
        }
    }
}

impl fmt::Display for Nomenclature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Nomenclature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            // Older botanical and bacteriological code names map onto their successors
            "ICN" | "ICBN" => Ok(Self::Icn),
            "ICNP" | "ICNB" => Ok(Self::Icnp),
            "ICZN" => Ok(Self::Iczn),
            "UNDEFINED" | "" => Ok(Self::Undefined),
            other => Err(format!("unknown nomenclatural code '{}'", other)),
        }
    }
}
