//! Test fixtures
//!
//! A miniature tree of life. Ott ids follow the real taxonomy where one exists so context
//! descriptors can carry them.

use indexmap::IndexMap;

use taxomatch_core::config::{
    BarrierClade, BarrierConfig, ContextDescriptor, ContextGroup, ContextsConfig, SynthesisConfig,
};
use taxomatch_core::{Config, Nomenclature, OttId, Rank};
use taxomatch_taxonomy::{DeprecatedRecord, SourceEdgeRecord, SynonymRecord, TaxonRecord};

pub fn ott(id: u64) -> OttId {
    OttId(id)
}

/// Builder for a single taxonomy record
#[derive(Debug, Clone)]
pub struct TaxonBuilder {
    record: TaxonRecord,
}

impl TaxonBuilder {
    pub fn new(ott_id: u64, name: impl Into<String>) -> Self {
        Self {
            record: TaxonRecord {
                ott_id: OttId(ott_id),
                parent_ott_id: None,
                name: name.into(),
                rank: Rank::Unranked,
                sources: Vec::new(),
                uniqname: String::new(),
                flags: Vec::new(),
            },
        }
    }

    pub fn parent(mut self, parent: u64) -> Self {
        self.record.parent_ott_id = Some(OttId(parent));
        self
    }

    pub fn rank(mut self, rank: &str) -> Self {
        self.record.rank = Rank::parse(rank);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.record.sources.push(source.into());
        self
    }

    pub fn uniqname(mut self, uniqname: impl Into<String>) -> Self {
        self.record.uniqname = uniqname.into();
        self
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.record.flags.push(flag.into());
        self
    }

    pub fn build(self) -> TaxonRecord {
        self.record
    }
}

/// Everything a load needs
#[derive(Debug, Clone, Default)]
pub struct TaxonomyFixture {
    pub records: Vec<TaxonRecord>,
    pub synonyms: Vec<SynonymRecord>,
    pub deprecated: Vec<DeprecatedRecord>,
    pub source_edges: Vec<SourceEdgeRecord>,
    pub metadata: IndexMap<String, String>,
}

impl TaxonomyFixture {
    pub fn record(&self, ott_id: u64) -> Option<&TaxonRecord> {
        self.records.iter().find(|r| r.ott_id == OttId(ott_id))
    }
}

pub fn synonym(name: &str, ott_id: u64) -> SynonymRecord {
    SynonymRecord {
        name: name.to_string(),
        synonym_type: "synonym".to_string(),
        ott_id: OttId(ott_id),
    }
}

// Ott ids of the fixture taxa
pub const LIFE: u64 = 805080;
pub const BACTERIA: u64 = 844192;
pub const ESCHERICHIA: u64 = 474503;
pub const ESCHERICHIA_COLI: u64 = 474506;
pub const EUKARYOTA: u64 = 304358;
pub const METAZOA: u64 = 691846;
pub const CHORDATA: u64 = 125642;
pub const MAMMALIA: u64 = 244265;
pub const PRIMATES: u64 = 913935;
pub const HOMINIDAE: u64 = 770311;
pub const HOMO: u64 = 770309;
pub const HOMO_SAPIENS: u64 = 770315;
pub const HOMO_ERECTUS: u64 = 4129209;
pub const PAN: u64 = 417957;
pub const PAN_TROGLODYTES: u64 = 417950;
pub const PAN_PANISCUS: u64 = 158484;
pub const GORILLA: u64 = 417969;
pub const GORILLA_GORILLA: u64 = 417965;
pub const AOTIDAE: u64 = 1083709;
pub const AOTUS_PRIMATE: u64 = 610487;
pub const AOTUS_TRIVIRGATUS: u64 = 610490;
pub const PRIMATES_INCERTAE_SEDIS: u64 = 9000001;
pub const DUBIOPITHECUS: u64 = 9000002;
pub const CARNIVORA: u64 = 44565;
pub const FELIS: u64 = 563165;
pub const FELIS_CATUS: u64 = 563166;
pub const AVES: u64 = 81461;
pub const CORVUS: u64 = 187411;
pub const CORVUS_CORAX: u64 = 187412;
pub const ARTHROPODA: u64 = 632179;
pub const INSECTA: u64 = 1062253;
pub const DROSOPHILA: u64 = 505714;
pub const DROSOPHILA_MELANOGASTER: u64 = 505717;
pub const VIRIDIPLANTAE: u64 = 361838;
pub const EMBRYOPHYTA: u64 = 5342313;
pub const FABACEAE: u64 = 560213;
pub const AOTUS_PLANT: u64 = 1053007;
pub const AOTUS_ERICOIDES: u64 = 1053010;
pub const PISUM: u64 = 560217;
pub const PISUM_SATIVUM: u64 = 560218;
pub const FUNGI: u64 = 352914;
pub const AMANITA: u64 = 804650;
pub const AMANITA_MUSCARIA: u64 = 804651;
pub const DEPRECATED_HOMINID: u64 = 5000001;

/// The fixture tree, records listed parents first
pub fn tree_of_life() -> TaxonomyFixture {
    let t = TaxonBuilder::new;
    let records = vec![
        t(LIFE, "life").rank("no rank").build(),
        t(BACTERIA, "Bacteria").parent(LIFE).rank("domain").source("ncbi:2").build(),
        t(ESCHERICHIA, "Escherichia").parent(BACTERIA).rank("genus").source("ncbi:561").build(),
        t(ESCHERICHIA_COLI, "Escherichia coli").parent(ESCHERICHIA).rank("species").source("ncbi:562").build(),
        t(EUKARYOTA, "Eukaryota").parent(LIFE).rank("domain").source("ncbi:2759").build(),
        t(METAZOA, "Metazoa").parent(EUKARYOTA).rank("kingdom").source("ncbi:33208").build(),
        t(CHORDATA, "Chordata").parent(METAZOA).rank("phylum").source("ncbi:7711").build(),
        t(MAMMALIA, "Mammalia").parent(CHORDATA).rank("class").source("ncbi:40674").build(),
        t(PRIMATES, "Primates").parent(MAMMALIA).rank("order").source("ncbi:9443").build(),
        t(HOMINIDAE, "Hominidae").parent(PRIMATES).rank("family").source("ncbi:9604").build(),
        t(HOMO, "Homo").parent(HOMINIDAE).rank("genus").source("ncbi:9605").build(),
        t(HOMO_SAPIENS, "Homo sapiens").parent(HOMO).rank("species").source("ncbi:9606").build(),
        t(HOMO_ERECTUS, "Homo erectus")
            .parent(HOMO)
            .rank("species")
            .flag("extinct")
            .build(),
        t(PAN, "Pan").parent(HOMINIDAE).rank("genus").source("ncbi:9596").build(),
        t(PAN_TROGLODYTES, "Pan troglodytes").parent(PAN).rank("species").source("ncbi:9598").build(),
        t(PAN_PANISCUS, "Pan paniscus").parent(PAN).rank("species").source("ncbi:9597").build(),
        t(GORILLA, "Gorilla").parent(HOMINIDAE).rank("genus").source("ncbi:9592").build(),
        t(GORILLA_GORILLA, "Gorilla gorilla").parent(GORILLA).rank("species").source("ncbi:9593").build(),
        t(AOTIDAE, "Aotidae").parent(PRIMATES).rank("family").source("ncbi:376911").build(),
        t(AOTUS_PRIMATE, "Aotus")
            .parent(AOTIDAE)
            .rank("genus")
            .uniqname("Aotus (genus in Opisthokonta)")
            .source("ncbi:9504")
            .build(),
        t(AOTUS_TRIVIRGATUS, "Aotus trivirgatus").parent(AOTUS_PRIMATE).rank("species").build(),
        t(PRIMATES_INCERTAE_SEDIS, "Primates incertae sedis")
            .parent(PRIMATES)
            .flag("incertae_sedis")
            .build(),
        t(DUBIOPITHECUS, "Dubiopithecus")
            .parent(PRIMATES_INCERTAE_SEDIS)
            .rank("genus")
            .flag("incertae_sedis_inherited")
            .build(),
        t(CARNIVORA, "Carnivora").parent(MAMMALIA).rank("order").build(),
        t(FELIS, "Felis").parent(CARNIVORA).rank("genus").build(),
        t(FELIS_CATUS, "Felis catus")
            .parent(FELIS)
            .rank("species")
            .flag("sibling_higher")
            .flag("bogus_flag")
            .build(),
        t(AVES, "Aves").parent(CHORDATA).rank("class").build(),
        t(CORVUS, "Corvus").parent(AVES).rank("genus").build(),
        t(CORVUS_CORAX, "Corvus corax").parent(CORVUS).rank("species").build(),
        t(ARTHROPODA, "Arthropoda").parent(METAZOA).rank("phylum").build(),
        t(INSECTA, "Insecta").parent(ARTHROPODA).rank("class").build(),
        t(DROSOPHILA, "Drosophila").parent(INSECTA).rank("genus").build(),
        t(DROSOPHILA_MELANOGASTER, "Drosophila melanogaster")
            .parent(DROSOPHILA)
            .rank("species")
            .build(),
        t(VIRIDIPLANTAE, "Viridiplantae").parent(EUKARYOTA).rank("kingdom").build(),
        t(EMBRYOPHYTA, "Embryophyta").parent(VIRIDIPLANTAE).build(),
        t(FABACEAE, "Fabaceae").parent(EMBRYOPHYTA).rank("family").build(),
        t(AOTUS_PLANT, "Aotus")
            .parent(FABACEAE)
            .rank("genus")
            .uniqname("Aotus (genus in Archaeplastida)")
            .build(),
        t(AOTUS_ERICOIDES, "Aotus ericoides").parent(AOTUS_PLANT).rank("species").build(),
        t(PISUM, "Pisum").parent(FABACEAE).rank("genus").build(),
        t(PISUM_SATIVUM, "Pisum sativum").parent(PISUM).rank("species").build(),
        t(FUNGI, "Fungi").parent(EUKARYOTA).rank("kingdom").build(),
        t(AMANITA, "Amanita").parent(FUNGI).rank("genus").build(),
        t(AMANITA_MUSCARIA, "Amanita muscaria").parent(AMANITA).rank("species").build(),
    ];

    let synonyms = vec![
        synonym("Pan satyrus", PAN_TROGLODYTES),
        synonym("Felis domesticus", FELIS_CATUS),
        synonym("Animalia", METAZOA),
        synonym("Plantae", VIRIDIPLANTAE),
        synonym("Pithecanthropus", HOMO),
        // Refers to a taxon missing from the tree
        synonym("Orphanus nominus", 123456789),
    ];

    let deprecated = vec![DeprecatedRecord {
        ott_id: OttId(DEPRECATED_HOMINID),
        name: "Homo neanderthalus".to_string(),
        reason: "merged into Homo".to_string(),
    }];

    let mut metadata = IndexMap::new();
    metadata.insert("version".to_string(), "3.5-fixture".to_string());
    metadata.insert("source".to_string(), "taxomatch-test".to_string());

    TaxonomyFixture {
        records,
        synonyms,
        deprecated,
        source_edges: Vec::new(),
        metadata,
    }
}

fn descriptor(
    name: &str,
    group: ContextGroup,
    suffix: &str,
    root: &str,
    ott_id: u64,
    nomenclature: Nomenclature,
) -> ContextDescriptor {
    ContextDescriptor {
        name: name.to_string(),
        group,
        index_suffix: suffix.to_string(),
        root_name: root.to_string(),
        ott_id: Some(OttId(ott_id)),
        nomenclature,
    }
}

/// Config sized for the fixture tree: a handful of contexts and small batches
pub fn fixture_config() -> Config {
    use ContextGroup::*;
    use Nomenclature::*;

    let contexts = ContextsConfig {
        life_context: "All life".to_string(),
        descriptors: vec![
            descriptor("All life", Life, "", "life", LIFE, Undefined),
            descriptor("Bacteria", Microbes, "Bacteria", "Bacteria", BACTERIA, Icnp),
            descriptor("Animals", Animals, "Animals", "Metazoa", METAZOA, Iczn),
            descriptor("Mammals", Animals, "Mammals", "Mammalia", MAMMALIA, Iczn),
            descriptor("Primates", Animals, "Primates", "Primates", PRIMATES, Iczn),
            descriptor("Birds", Animals, "Birds", "Aves", AVES, Iczn),
            descriptor("Insects", Animals, "Insects", "Insecta", INSECTA, Iczn),
            descriptor("Fungi", ContextGroup::Fungi, "Fungi", "Fungi", FUNGI, Icn),
            descriptor("Land plants", Plants, "Plants", "Embryophyta", EMBRYOPHYTA, Icn),
        ],
    };

    let barrier = |name: &str, nomenclature, alternates: &[&str]| BarrierClade {
        name: name.to_string(),
        nomenclature,
        alternate_names: alternates.iter().map(|s| s.to_string()).collect(),
    };
    let barriers = BarrierConfig {
        clades: vec![
            barrier("Fungi", Icn, &[]),
            barrier("Viridiplantae", Icn, &["Plantae"]),
            barrier("Bacteria", Icnp, &[]),
            barrier("Metazoa", Iczn, &["Animalia"]),
            barrier("Choanoflagellida", Iczn, &[]),
        ],
    };

    Config {
        barriers,
        contexts,
        synthesis: SynthesisConfig {
            batch_size: 16,
            ..SynthesisConfig::default()
        },
        ..Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixture_is_consistent() {
        let fixture = tree_of_life();
        let ids: HashSet<OttId> = fixture.records.iter().map(|r| r.ott_id).collect();
        assert_eq!(ids.len(), fixture.records.len());

        let roots: Vec<_> = fixture.records.iter().filter(|r| r.parent_ott_id.is_none()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "life");

        for record in &fixture.records {
            if let Some(parent) = record.parent_ott_id {
                assert!(ids.contains(&parent), "{} has no parent record", record.name);
            }
        }
    }

    #[test]
    fn test_fixture_config_is_valid() {
        let config = fixture_config();
        assert!(config.validate().is_ok());
        assert!(config.contexts.descriptor("Primates").is_some());
    }

    #[test]
    fn test_builder() {
        let record = TaxonBuilder::new(1, "Aotus").parent(2).rank("Genus").flag("hidden").build();
        assert_eq!(record.parent_ott_id, Some(OttId(2)));
        assert_eq!(record.rank, Rank::Genus);
        assert_eq!(record.flags, vec!["hidden"]);
        assert_eq!(tree_of_life().record(HOMO_SAPIENS).unwrap().name, "Homo sapiens");
    }
}
