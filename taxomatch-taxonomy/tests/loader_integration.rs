/// Integration tests for loading taxonomy records
use pretty_assertions::assert_eq;
use std::sync::Arc;

use taxomatch_core::{OttId, Rank, TaxomatchError, TaxonFlag};
use taxomatch_storage::{Direction, EdgeKind, MemoryGraph, NodeIndexKind, TaxonStore};
use taxomatch_taxonomy::{SourceEdgeRecord, Taxon, TaxonLookup, Taxonomy};
use taxomatch_test::fixtures::*;
use taxomatch_test::{fixture_config, init_test_logging, loaded_taxonomy, TaxonBuilder};

fn empty_taxonomy() -> Taxonomy {
    Taxonomy::new(Arc::new(MemoryGraph::new()), fixture_config())
}

#[test]
fn test_load_summary() {
    init_test_logging();
    let fixture = tree_of_life();
    let t = loaded_taxonomy();

    assert_eq!(t.load.taxa, fixture.records.len());
    assert_eq!(t.load.dubious, 2);
    assert_eq!(t.load.synonyms, fixture.synonyms.len() - 1);
    assert_eq!(t.load.skipped_synonyms, 1);
    assert_eq!(t.load.deprecated, 1);
    assert_eq!(t.load.life_node, t.node(LIFE));
    assert_eq!(t.taxonomy.life_node().unwrap(), t.node(LIFE));
}

#[test]
fn test_taxon_properties_survive_load() {
    let t = loaded_taxonomy();

    let sapiens = Taxon::require(t.store(), t.node(HOMO_SAPIENS)).unwrap();
    assert_eq!(sapiens.name, "Homo sapiens");
    assert_eq!(sapiens.rank, Rank::Species);
    assert_eq!(sapiens.sources, vec!["ncbi:9606"]);
    assert!(!sapiens.dubious);

    let aotus = Taxon::require(t.store(), t.node(AOTUS_PLANT)).unwrap();
    assert_eq!(aotus.unique_name, "Aotus (genus in Archaeplastida)");

    let felis = Taxon::require(t.store(), t.node(FELIS_CATUS)).unwrap();
    assert_eq!(felis.flags, vec![TaxonFlag::SiblingHigher]);
    assert!(!felis.dubious);

    let incertae = Taxon::require(t.store(), t.node(PRIMATES_INCERTAE_SEDIS)).unwrap();
    assert!(incertae.dubious);
}

#[test]
fn test_child_of_edges_carry_source() {
    let t = loaded_taxonomy();
    let edges = t
        .store()
        .edges(t.node(HOMO_SAPIENS), EdgeKind::ChildOf, Direction::Outgoing)
        .unwrap();

    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, t.node(HOMO));
    assert_eq!(edges[0].source(), Some("ott"));

    // Preferred edges wait for synthesis
    assert!(t
        .store()
        .edges(t.node(HOMO_SAPIENS), EdgeKind::PreferredChildOf, Direction::Outgoing)
        .unwrap()
        .is_empty());
}

#[test]
fn test_synonyms_link_to_taxa() {
    let t = loaded_taxonomy();
    let troglodytes = Taxon::require(t.store(), t.node(PAN_TROGLODYTES)).unwrap();
    assert_eq!(troglodytes.synonyms(t.store()).unwrap(), vec!["Pan satyrus"]);
}

#[test]
fn test_lookup_by_ott_id() {
    let t = loaded_taxonomy();

    match t.taxonomy.taxon_by_ott_id(OttId(GORILLA_GORILLA)).unwrap() {
        Some(TaxonLookup::Current(taxon)) => assert_eq!(taxon.name, "Gorilla gorilla"),
        other => panic!("Expected a current taxon, got {:?}", other),
    }

    match t.taxonomy.taxon_by_ott_id(OttId(DEPRECATED_HOMINID)).unwrap() {
        Some(TaxonLookup::Deprecated(deprecated)) => {
            assert_eq!(deprecated.name, "Homo neanderthalus");
            assert_eq!(deprecated.reason, "merged into Homo");
        }
        other => panic!("Expected a deprecated taxon, got {:?}", other),
    }

    assert!(t.taxonomy.taxon_by_ott_id(OttId(42)).unwrap().is_none());
}

#[test]
fn test_flag_index() {
    let t = loaded_taxonomy();
    let extinct = t
        .store()
        .exact_lookup(&NodeIndexKind::TaxonByFlag.index_name(""), "extinct")
        .unwrap();
    assert_eq!(extinct, vec![t.node(HOMO_ERECTUS)]);
}

#[test]
fn test_taxonomy_metadata() {
    let t = loaded_taxonomy();
    let metadata = t.taxonomy.metadata().unwrap();
    assert_eq!(metadata.get("version").map(String::as_str), Some("3.5-fixture"));
    assert_eq!(metadata.len(), 2);
}

#[test]
fn test_malformed_inputs_are_rejected() {
    let cases = vec![
        (
            "duplicate ott id",
            vec![
                TaxonBuilder::new(1, "life").build(),
                TaxonBuilder::new(1, "again").parent(1).build(),
            ],
        ),
        (
            "two roots",
            vec![TaxonBuilder::new(1, "life").build(), TaxonBuilder::new(2, "other").build()],
        ),
        (
            "unknown parent",
            vec![
                TaxonBuilder::new(1, "life").build(),
                TaxonBuilder::new(2, "Homo").parent(99).build(),
            ],
        ),
        ("no root", vec![]),
    ];

    for (label, records) in cases {
        let taxonomy = empty_taxonomy();
        match taxonomy.load(records, vec![], vec![], &Default::default()) {
            Err(TaxomatchError::MalformedTaxonomy(_)) => {}
            other => panic!("{}: expected MalformedTaxonomy, got {:?}", label, other),
        }
        // Nothing was committed
        assert!(taxonomy.life_node().is_err(), "{} left a partial load", label);
    }
}

#[test]
fn test_source_edges() {
    let t = loaded_taxonomy();
    let added = t
        .taxonomy
        .load_source_edges(&[SourceEdgeRecord {
            child: OttId(HOMO_SAPIENS),
            parent: OttId(PAN),
            source: "gbif".to_string(),
        }])
        .unwrap();
    assert_eq!(added, 1);

    let edges = t
        .store()
        .edges(t.node(HOMO_SAPIENS), EdgeKind::ChildOf, Direction::Outgoing)
        .unwrap();
    let sources: Vec<_> = edges.iter().filter_map(|e| e.source()).collect();
    assert_eq!(sources, vec!["ott", "gbif"]);

    let unknown = t.taxonomy.load_source_edges(&[SourceEdgeRecord {
        child: OttId(HOMO_SAPIENS),
        parent: OttId(1),
        source: "gbif".to_string(),
    }]);
    assert!(matches!(unknown, Err(TaxomatchError::MalformedTaxonomy(_))));
}
