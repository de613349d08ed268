/// Integration tests for batch name resolution and context inference
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeSet;
use std::thread;

use taxomatch_core::config::TnrsConfig;
use taxomatch_core::{Nomenclature, OttId, TaxomatchError};
use taxomatch_taxonomy::TaxonLookup;
use taxomatch_test::fixtures::*;
use taxomatch_test::{built_taxonomy, init_test_logging, TestTaxonomy};
use taxomatch_tnrs::{TnrsMatch, TnrsRequest, TnrsResults, TnrsService};

fn resolve(t: &TestTaxonomy, request: TnrsRequest) -> TnrsResults {
    TnrsService::new(&t.taxonomy).resolve_names(&request).unwrap()
}

fn only_match<'r>(results: &'r TnrsResults, id: &str) -> &'r TnrsMatch {
    let result = results.result(id).unwrap_or_else(|| panic!("no result for {}", id));
    assert_eq!(result.matches.len(), 1, "{:?}", result.matches);
    &result.matches[0]
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_great_apes_resolve_in_primates() {
    init_test_logging();
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Homo sapiens", "Pan troglodytes", "Gorilla gorilla"]));

    assert_eq!(results.context_name, "Primates");
    assert_eq!(results.governing_code, Nomenclature::Iczn);
    assert_eq!(results.matched_count(), 3);
    assert!(results.unmatched.is_empty());
    assert!(!results.includes_approximate_matches);
    assert_eq!(results.direct_match_ids.len(), 3);

    let sapiens = only_match(&results, "Homo sapiens");
    assert_eq!(sapiens.ott_id, OttId(HOMO_SAPIENS));
    assert!(sapiens.is_perfect_match());
    assert_eq!(sapiens.match_description(), "unambiguous match to known taxon");
    assert_eq!(sapiens.source, "ott");

    let expected: BTreeSet<OttId> = [HOMO_SAPIENS, PAN_TROGLODYTES, GORILLA_GORILLA]
        .into_iter()
        .map(OttId)
        .collect();
    assert_eq!(results.matched_ott_ids, expected);
    assert_eq!(results.taxonomy.get("version").map(String::as_str), Some("3.5-fixture"));
}

#[test]
fn test_infer_context() {
    let t = built_taxonomy();
    let service = TnrsService::new(&t.taxonomy);

    let apes = service
        .infer_context(&names(&["Homo sapiens", "Pan troglodytes", "Gorilla gorilla"]))
        .unwrap();
    assert_eq!(apes.context.name(), "Primates");
    assert!(apes.unmatched_names.is_empty());

    let mixed = service
        .infer_context(&names(&["Homo sapiens", "Corvus corax", "Aotus", "Nonesuch"]))
        .unwrap();
    assert_eq!(mixed.context.name(), "Animals");
    assert_eq!(mixed.unmatched_names, names(&["Aotus", "Nonesuch"]));

    let nothing = service.infer_context(&names(&["Nonesuch"])).unwrap();
    assert_eq!(nothing.context.name(), "All life");
}

#[test]
fn test_misspelling_matches_approximately() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Homo sapiens", "Pan troglodytes", "Gorila gorilla"]));

    assert_eq!(results.context_name, "Primates");
    assert!(results.includes_approximate_matches);
    assert!(!results.direct_match_ids.contains("Gorila gorilla"));

    let gorilla = only_match(&results, "Gorila gorilla");
    assert_eq!(gorilla.ott_id, OttId(GORILLA_GORILLA));
    assert!(gorilla.is_approximate);
    assert!(gorilla.score > 0.0 && gorilla.score < 1.0);
    assert!((gorilla.score - 13.0 / 14.0).abs() < 1e-9);
    assert_eq!(gorilla.match_description(), "approximate match to known taxon");
}

#[test]
fn test_distant_approximate_match_is_discounted() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Homo sapiens", "Pan troglodytes", "Aotus trivirgatis"]));

    // Four preferred edges separate Hominidae from Aotus trivirgatus
    let aotus = only_match(&results, "Aotus trivirgatis");
    assert_eq!(aotus.ott_id, OttId(AOTUS_TRIVIRGATUS));
    let expected = (16.0 / 17.0) / 4f64.ln();
    assert!((aotus.score - expected).abs() < 1e-9, "score {}", aotus.score);
}

#[test]
fn test_fuzzy_off_leaves_misspellings_unmatched() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Homo sapiens", "Gorila gorilla"]).fuzzy(false));

    assert_eq!(results.unmatched.get("Gorila gorilla").map(String::as_str), Some("Gorila gorilla"));
    assert!(!results.includes_approximate_matches);
}

#[test]
fn test_synonym_match() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Pan satyrus"]));

    assert_eq!(results.context_name, "All life");
    let troglodytes = only_match(&results, "Pan satyrus");
    assert_eq!(troglodytes.ott_id, OttId(PAN_TROGLODYTES));
    assert_eq!(troglodytes.matched_name, "Pan satyrus");
    assert_eq!(troglodytes.unique_name, "Pan troglodytes");
    assert!(troglodytes.is_synonym);
    assert_eq!(troglodytes.match_description(), "exact match to known synonym");
    assert!(results.direct_match_ids.is_empty());
}

#[test]
fn test_genus_sp_names_match_the_genus() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Homo sp."]));

    let homo = only_match(&results, "Homo sp.");
    assert_eq!(homo.ott_id, OttId(HOMO));
    assert_eq!(homo.score, 0.99);
    assert!(!homo.is_perfect_match());
    assert!(results.direct_match_ids.is_empty());

    let disabled = resolve(
        &t,
        TnrsRequest::new(["Homo sp."]).match_sp_to_genus(false).fuzzy(false),
    );
    assert!(disabled.unmatched.contains_key("Homo sp."));
}

#[test]
fn test_homonyms() {
    let t = built_taxonomy();

    let alone = resolve(&t, TnrsRequest::new(["Aotus"]).fuzzy(false));
    assert_eq!(alone.context_name, "All life");
    let matches = &alone.result("Aotus").unwrap().matches;
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.is_homonym));
    assert_eq!(matches[0].match_description(), "exact match to known taxon; also a homonym");
    assert!(!alone.direct_match_ids.contains("Aotus"));
}

#[test]
fn test_homonyms_do_not_anchor_the_batch() {
    let t = built_taxonomy();
    let results = resolve(
        &t,
        TnrsRequest::new(["Homo sapiens", "Aotus", "Gorila gorilla"]).in_context("All life"),
    );

    // Both readings of Aotus are reported but only Homo sapiens places the LICA
    assert_eq!(results.result("Aotus").unwrap().matches.len(), 2);
    assert_eq!(
        results.direct_match_ids.iter().collect::<Vec<_>>(),
        vec!["Homo sapiens"]
    );

    // Homo sapiens and Gorilla gorilla are four preferred edges apart
    let gorilla = only_match(&results, "Gorila gorilla");
    assert_eq!(gorilla.ott_id, OttId(GORILLA_GORILLA));
    let expected = (13.0 / 14.0) / 4f64.ln();
    assert!((gorilla.score - expected).abs() < 1e-9, "score {}", gorilla.score);
}

#[test]
fn test_shared_synonyms_are_not_homonyms() {
    let mut fixture = tree_of_life();
    fixture.synonyms.push(synonym("Anthropopithecus", PAN_TROGLODYTES));
    fixture.synonyms.push(synonym("Anthropopithecus", GORILLA_GORILLA));
    let t = TestTaxonomy::load(fixture, fixture_config())
        .and_then(|t| t.synthesize())
        .and_then(|t| t.build_contexts())
        .unwrap();

    let results = resolve(&t, TnrsRequest::new(["Anthropopithecus"]).fuzzy(false));
    let matches = &results.result("Anthropopithecus").unwrap().matches;
    assert_eq!(matches.len(), 2);
    for m in matches {
        assert!(m.is_synonym);
        assert!(!m.is_homonym);
        assert_eq!(m.match_description(), "exact match to known synonym");
    }
}

#[test]
fn test_detached_taxa_do_not_anchor_the_batch() {
    let mut fixture = tree_of_life();
    fixture.records.push(
        TaxonBuilder::new(9000003, "Detachus")
            .parent(PRIMATES_INCERTAE_SEDIS)
            .rank("genus")
            .build(),
    );
    let t = TestTaxonomy::load(fixture, fixture_config())
        .and_then(|t| t.synthesize())
        .and_then(|t| t.build_contexts())
        .unwrap();

    let results = resolve(&t, TnrsRequest::new(["Homo sapiens", "Detachus"]).include_dubious(true));
    assert_eq!(results.context_name, "Primates");
    assert!(results.is_matched("Detachus"));
}

#[rstest]
#[case("Homo sapiens", "Primates", AOTUS_PRIMATE)]
#[case("Pisum sativum", "Land plants", AOTUS_PLANT)]
fn test_inferred_context_settles_homonyms(#[case] anchor: &str, #[case] context: &str, #[case] expected: u64) {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new([anchor, "Aotus"]));

    assert_eq!(results.context_name, context);
    let aotus = only_match(&results, "Aotus");
    assert_eq!(aotus.ott_id, OttId(expected));
    assert!(!aotus.is_homonym);
}

#[test]
fn test_supplied_context() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Aotus"]).in_context("Primates"));
    assert_eq!(results.context_name, "Primates");
    assert_eq!(only_match(&results, "Aotus").ott_id, OttId(AOTUS_PRIMATE));

    // Names outside the supplied context stay unmatched
    let results = resolve(&t, TnrsRequest::new(["Felis catus"]).in_context("Primates").fuzzy(false));
    assert!(results.unmatched.contains_key("Felis catus"));
}

#[test]
fn test_deprecated_taxa() {
    let t = built_taxonomy();

    let excluded = resolve(&t, TnrsRequest::new(["Homo neanderthalus"]));
    assert!(excluded.unmatched.contains_key("Homo neanderthalus"));
    assert!(!excluded.includes_deprecated);

    let included = resolve(&t, TnrsRequest::new(["Homo neanderthalus"]).include_deprecated(true));
    assert!(included.includes_deprecated);
    let m = only_match(&included, "Homo neanderthalus");
    assert_eq!(m.ott_id, OttId(DEPRECATED_HOMINID));
    assert!(m.is_deprecated);
    assert_eq!(m.match_description(), "exact match; name status unknown");

    let misspelled = resolve(&t, TnrsRequest::new(["Homo neanderthalis"]).include_deprecated(true));
    let m = only_match(&misspelled, "Homo neanderthalis");
    assert!(m.is_deprecated && m.is_approximate);
    assert!((m.score - 17.0 / 18.0).abs() < 1e-9);
}

#[test]
fn test_dubious_taxa() {
    let t = built_taxonomy();

    let excluded = resolve(&t, TnrsRequest::new(["Dubiopithecus"]).fuzzy(false));
    assert!(excluded.unmatched.contains_key("Dubiopithecus"));

    let included = resolve(&t, TnrsRequest::new(["Dubiopithecus"]).include_dubious(true));
    assert!(included.includes_dubious);
    assert_eq!(included.context_name, "All life");
    let m = only_match(&included, "Dubiopithecus");
    assert_eq!(m.ott_id, OttId(DUBIOPITHECUS));
    assert!(m.is_dubious);
}

#[test]
fn test_ids_and_scrubbing() {
    let t = built_taxonomy();
    let results = resolve(
        &t,
        TnrsRequest::new(["Homo_sapiens", "Xyzzy plugh"]).with_ids(["1", "2"]),
    );

    let result = results.result("1").unwrap();
    assert_eq!(result.name, "Homo_sapiens");
    assert_eq!(result.matches[0].search_string, "Homo sapiens");
    assert!(results.direct_match_ids.contains("1"));

    assert_eq!(results.unmatched.len(), 1);
    assert_eq!(results.unmatched.get("2").map(String::as_str), Some("Xyzzy plugh"));
}

#[rstest]
#[case("Corvus corax")]
#[case("Escherichia coli")]
#[case("Fabaceae")]
#[case("Drosophila melanogaster")]
fn test_unique_names_are_direct_matches(#[case] name: &str) {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new([name]));

    assert!(results.direct_match_ids.contains(name));
    assert!(!results.includes_approximate_matches);
    assert!(only_match(&results, name).is_perfect_match());
}

#[test]
fn test_query_errors_come_first() {
    let t = built_taxonomy();
    let service = TnrsService::with_config(
        &t.taxonomy,
        TnrsConfig {
            max_fuzzy_names: 2,
            ..TnrsConfig::default()
        },
    );

    let errors = vec![
        service.resolve_names(&TnrsRequest::new(["Homo sapiens"]).with_ids(["1", "2"])),
        service.resolve_names(&TnrsRequest::new(["Homo sapiens", "Pan"]).with_ids(["1", "1"])),
        service.resolve_names(&TnrsRequest::new(["Homo", "Pan", "Gorilla"])),
        service.resolve_names(&TnrsRequest::new(["Homo"]).in_context("Sponges")),
    ];
    for error in errors {
        let error = error.unwrap_err();
        assert!(error.is_query_error(), "{:?}", error);
    }

    match service.resolve_names(&TnrsRequest::new(["Homo", "Pan", "Gorilla"])) {
        Err(TaxomatchError::BatchTooLarge { size, limit }) => assert_eq!((size, limit), (3, 2)),
        other => panic!("Expected BatchTooLarge, got {:?}", other),
    }
    // Exact-only batches use the larger limit
    assert!(service
        .resolve_names(&TnrsRequest::new(["Homo", "Pan", "Gorilla"]).fuzzy(false))
        .is_ok());
}

#[test]
fn test_results_serialize() {
    let t = built_taxonomy();
    let results = resolve(&t, TnrsRequest::new(["Homo sapiens", "Nonesuch"]));
    let json = results.to_json().unwrap();

    assert!(json.contains("\"governing_code\": \"ICZN\""));
    let parsed: TnrsResults = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, results);
}

#[test]
fn test_lookups_by_ott_id_and_contexts() {
    let t = built_taxonomy();
    let service = TnrsService::new(&t.taxonomy);

    assert!(matches!(
        service.taxon_by_ott_id(OttId(PAN_PANISCUS)).unwrap(),
        Some(TaxonLookup::Current(taxon)) if taxon.name == "Pan paniscus"
    ));
    assert!(service.contexts().unwrap().contains("Birds"));
}

#[test]
fn test_parallel_queries() {
    let t = built_taxonomy();
    let service = TnrsService::new(&t.taxonomy);
    let batches = [
        vec!["Homo sapiens", "Pan troglodytes"],
        vec!["Corvus corax"],
        vec!["Aotus ericoides", "Pisum sativum"],
    ];

    let contexts: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = batches
            .iter()
            .map(|batch| {
                let service = &service;
                scope.spawn(move || {
                    service
                        .resolve_names(&TnrsRequest::new(batch.iter().copied()))
                        .unwrap()
                        .context_name
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(contexts, vec!["Primates", "Birds", "Land plants"]);
}
