//! Configuration types for taxomatch

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{Nomenclature, OttId};
use crate::TaxomatchError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub barriers: BarrierConfig,
    #[serde(default)]
    pub contexts: ContextsConfig,
    #[serde(default)]
    pub tnrs: TnrsConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Clades whose descendants are governed by one nomenclatural code.
///
/// Processing follows list order; a later clade overrides an earlier one where subtrees
/// overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrierConfig {
    #[serde(default = "default_barrier_clades")]
    pub clades: Vec<BarrierClade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierClade {
    pub name: String,
    pub nomenclature: Nomenclature,
    /// Names tried when `name` has no direct match
    #[serde(default)]
    pub alternate_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextGroup {
    Life,
    Microbes,
    Animals,
    Fungi,
    Plants,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDescriptor {
    /// Display name, e.g. "Mammals"
    pub name: String,
    pub group: ContextGroup,
    /// Suffix appended to index names built for this context
    pub index_suffix: String,
    /// Name of the taxon at the root of the context
    pub root_name: String,
    #[serde(default)]
    pub ott_id: Option<OttId>,
    pub nomenclature: Nomenclature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextsConfig {
    /// Name of the all-life context; its root is the taxonomy root
    #[serde(default = "default_life_context")]
    pub life_context: String,
    #[serde(default = "default_context_descriptors")]
    pub descriptors: Vec<ContextDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TnrsConfig {
    /// Largest batch accepted when fuzzy matching is off
    #[serde(default = "default_max_exact_names")]
    pub max_exact_names: usize,
    /// Largest batch accepted when fuzzy matching is on
    #[serde(default = "default_max_fuzzy_names")]
    pub max_fuzzy_names: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Score given to "Genus sp." names matched at genus level
    #[serde(default = "default_genus_only_score")]
    pub genus_only_score: f64,
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
    #[serde(default = "default_min_prefix_length")]
    pub min_prefix_length: usize,
    /// Source label attached to every match
    #[serde(default = "default_taxonomy_name")]
    pub taxonomy_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Operations per committed transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Sources whose parent assignments win conflicts, highest priority first
    #[serde(default = "default_trusted_sources")]
    pub trusted_sources: Vec<String>,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

// Default value functions
fn default_max_exact_names() -> usize { 10_000 }
fn default_max_fuzzy_names() -> usize { 250 }
fn default_min_score() -> f64 { 0.01 }
fn default_genus_only_score() -> f64 { 0.99 }
fn default_min_query_length() -> usize { 2 }
fn default_min_prefix_length() -> usize { 3 }
fn default_taxonomy_name() -> String { "ott".to_string() }
fn default_batch_size() -> usize { 50_000 }
fn default_trusted_sources() -> Vec<String> { vec!["ncbi".to_string(), "paul_kirk_fungi".to_string()] }
fn default_show_progress() -> bool { false }
fn default_life_context() -> String { "All life".to_string() }

fn default_barrier_clades() -> Vec<BarrierClade> {
    let clade = |name: &str, nomenclature, alternates: &[&str]| BarrierClade {
        name: name.to_string(),
        nomenclature,
        alternate_names: alternates.iter().map(|s| s.to_string()).collect(),
    };

    vec![
        clade("Fungi", Nomenclature::Icn, &[]),
        clade("Viridiplantae", Nomenclature::Icn, &["Plantae"]),
        clade("Bacteria", Nomenclature::Icnp, &[]),
        clade("Metazoa", Nomenclature::Iczn, &["Animalia"]),
        clade("Alveolata", Nomenclature::Icn, &[]),
        clade("Rhodophyta", Nomenclature::Icn, &[]),
        clade("Glaucocystophyceae", Nomenclature::Icn, &[]),
        clade("Haptophyceae", Nomenclature::Icn, &[]),
        clade("Choanoflagellida", Nomenclature::Iczn, &[]),
    ]
}

fn default_context_descriptors() -> Vec<ContextDescriptor> {
    use ContextGroup::*;
    use Nomenclature::*;

    let d = |name: &str, group, suffix: &str, root: &str, ott: u64, nomenclature| ContextDescriptor {
        name: name.to_string(),
        group,
        index_suffix: suffix.to_string(),
        root_name: root.to_string(),
        ott_id: Some(OttId(ott)),
        nomenclature,
    };

    vec![
        d("All life", Life, "", "life", 805080, Undefined),
        d("Bacteria", Microbes, "Bacteria", "Bacteria", 844192, Icnp),
        d("SAR group", Microbes, "SAR", "SAR", 5246039, Undefined),
        d("Archaea", Microbes, "Archaea", "Archaea", 996421, Icnp),
        d("Excavata", Microbes, "Excavata", "Excavata", 2927065, Undefined),
        d("Amoebozoa", Microbes, "Amoebae", "Amoebozoa", 1064655, Iczn),
        d("Centrohelida", Microbes, "Centrohelida", "Centrohelida", 755852, Iczn),
        d("Haptophyta", Microbes, "Haptophyta", "Haptophyta", 151014, Undefined),
        d("Apusozoa", Microbes, "Apusozoa", "Apusozoa", 671092, Iczn),
        d("Diatoms", Microbes, "Diatoms", "Bacillariophyta", 5342311, Icn),
        d("Ciliates", Microbes, "Ciliates", "Ciliophora", 302424, Undefined),
        d("Forams", Microbes, "Forams", "Foraminifera", 936399, Iczn),
        d("Animals", Animals, "Animals", "Metazoa", 691846, Iczn),
        d("Birds", Animals, "Birds", "Aves", 81461, Iczn),
        d("Tetrapods", Animals, "Tetrapods", "Tetrapoda", 229562, Iczn),
        d("Mammals", Animals, "Mammals", "Mammalia", 244265, Iczn),
        d("Amphibians", Animals, "Amphibians", "Amphibia", 544595, Iczn),
        d("Vertebrates", Animals, "Vertebrates", "Vertebrata", 801601, Iczn),
        d("Arthropods", Animals, "Arthropods", "Arthropoda", 632179, Iczn),
        d("Molluscs", Animals, "Molluscs", "Mollusca", 802117, Iczn),
        d("Nematodes", Animals, "Nematodes", "Nematoda", 395057, Iczn),
        d("Platyhelminthes", Animals, "Platyhelminthes", "Platyhelminthes", 555379, Iczn),
        d("Annelids", Animals, "Annelids", "Annelida", 941620, Iczn),
        d("Cnidarians", Animals, "Cnidarians", "Cnidaria", 641033, Iczn),
        d("Arachnids", Animals, "Arachnids", "Arachnida", 511967, Iczn),
        d("Insects", Animals, "Insects", "Insecta", 1062253, Iczn),
        d("Fungi", Fungi, "Fungi", "Fungi", 352914, Icn),
        d("Basidiomycetes", Fungi, "Basidiomycetes", "Basidiomycota", 634628, Icn),
        d("Ascomycetes", Fungi, "Ascomycota", "Ascomycota", 439373, Icn),
        d("Land plants", Plants, "Plants", "Embryophyta", 5342313, Icn),
        d("Hornworts", Plants, "Anthocerotophyta", "Anthocerotophyta", 738980, Icn),
        d("Mosses", Plants, "Bryophyta", "Bryophyta", 246594, Icn),
        d("Liverworts", Plants, "Marchantiophyta", "Marchantiophyta", 56601, Icn),
        d("Vascular plants", Plants, "Tracheophyta", "Tracheophyta", 10210, Icn),
        d("Club mosses", Plants, "Lycopodiopsida", "Lycopodiopsida", 144795, Icn),
        d("Ferns", Plants, "Moniliformopses", "Moniliformopses", 166292, Icn),
        d("Seed plants", Plants, "Spermatophyta", "Spermatophyta", 10218, Icn),
        d("Flowering plants", Plants, "Magnoliophyta", "Magnoliophyta", 99252, Icn),
        d("Monocots", Plants, "Monocots", "Liliopsida", 1058517, Icn),
        d("Eudicots", Plants, "Eudicots", "eudicotyledons", 431495, Icn),
        d("Rosids", Plants, "Rosids", "rosids", 1008296, Icn),
        d("Asterids", Plants, "Asterids", "asterids", 1008294, Icn),
        d("Asterales", Plants, "Asterales", "Asterales", 1042120, Icn),
        d("Asteraceae", Plants, "Asteraceae", "Asteraceae", 46248, Icn),
        d("Aster", Plants, "Aster", "Aster", 409712, Icn),
        d("Symphyotrichum", Plants, "Symphyotrichum", "Symphyotrichum", 1058735, Icn),
        d("Campanulaceae", Plants, "Campanulaceae", "Campanulaceae", 1086303, Icn),
        d("Lobelia", Plants, "Lobelia", "Lobelia", 1086294, Icn),
    ]
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            clades: default_barrier_clades(),
        }
    }
}

impl Default for ContextsConfig {
    fn default() -> Self {
        Self {
            life_context: default_life_context(),
            descriptors: default_context_descriptors(),
        }
    }
}

impl Default for TnrsConfig {
    fn default() -> Self {
        Self {
            max_exact_names: default_max_exact_names(),
            max_fuzzy_names: default_max_fuzzy_names(),
            min_score: default_min_score(),
            genus_only_score: default_genus_only_score(),
            min_query_length: default_min_query_length(),
            min_prefix_length: default_min_prefix_length(),
            taxonomy_name: default_taxonomy_name(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            trusted_sources: default_trusted_sources(),
            show_progress: default_show_progress(),
        }
    }
}

impl ContextsConfig {
    pub fn descriptor(&self, name: &str) -> Option<&ContextDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn life_descriptor(&self) -> Option<&ContextDescriptor> {
        self.descriptor(&self.life_context)
    }
}

impl Config {
    /// Reject settings the resolvers cannot work with
    pub fn validate(&self) -> Result<(), TaxomatchError> {
        if self.synthesis.batch_size == 0 {
            return Err(TaxomatchError::Configuration(
                "synthesis.batch_size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tnrs.min_score) {
            return Err(TaxomatchError::Configuration(format!(
                "tnrs.min_score must be within [0, 1], got {}",
                self.tnrs.min_score
            )));
        }
        if !(0.0..1.0).contains(&self.tnrs.genus_only_score) {
            return Err(TaxomatchError::Configuration(format!(
                "tnrs.genus_only_score must be below a perfect score, got {}",
                self.tnrs.genus_only_score
            )));
        }
        if self.contexts.life_descriptor().is_none() {
            return Err(TaxomatchError::Configuration(format!(
                "no context descriptor named '{}'",
                self.contexts.life_context
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for d in &self.contexts.descriptors {
            if !seen.insert(d.name.as_str()) {
                return Err(TaxomatchError::Configuration(format!(
                    "duplicate context descriptor '{}'",
                    d.name
                )));
            }
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, TaxomatchError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| TaxomatchError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), TaxomatchError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| TaxomatchError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub const CONFIG_ENV_VAR: &str = "TAXOMATCH_CONFIG";
pub const HOME_ENV_VAR: &str = "TAXOMATCH_HOME";

/// Where the barrier, context and scoring settings are read from.
///
/// An explicit config file wins, then `config.toml` under the taxomatch home,
/// then `~/.taxomatch/config.toml`.
pub fn resolve_config_path(
    config_file: Option<PathBuf>,
    taxomatch_home: Option<PathBuf>,
    user_home: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = config_file {
        return path;
    }
    taxomatch_home
        .unwrap_or_else(|| user_home.unwrap_or_else(|| PathBuf::from(".")).join(".taxomatch"))
        .join("config.toml")
}

/// Config path for the current environment
pub fn default_config_path() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    resolve_config_path(
        var(CONFIG_ENV_VAR),
        var(HOME_ENV_VAR),
        var("HOME").or_else(|| var("USERPROFILE")),
    )
}

/// Load `$TAXOMATCH_CONFIG` (or `$TAXOMATCH_HOME/config.toml`) when present, else defaults
pub fn load_default_config() -> Result<Config, TaxomatchError> {
    let path = default_config_path();
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}
