use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use std::thread;

use taxomatch_core::{NodeId, TaxomatchError};
use taxomatch_storage::{
    BatchWriter, Direction, EdgeKind, IndexName, MemoryGraph, NodeIndexKind, Properties,
    PropertyValue, TaxonStore, WriteBatch,
};

fn name_index() -> IndexName {
    NodeIndexKind::TaxonByName.index_name("")
}

/// Commit a parent-to-child chain of named nodes
fn chain(graph: &MemoryGraph, names: &[&str]) -> Vec<NodeId> {
    let mut batch = WriteBatch::new();
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let id = graph.allocate_node_id();
        let mut properties = Properties::new();
        properties.insert("name".to_string(), (*name).into());
        batch.create_node(id, properties);
        batch.index_add(&name_index(), *name, id);
        if i > 0 {
            batch.create_edge(id, ids[i - 1], EdgeKind::ChildOf, Properties::new());
        }
        ids.push(id);
    }
    graph.commit(batch).unwrap();
    ids
}

#[test]
fn test_batch_writer_commits_in_bounded_batches() {
    let graph = MemoryGraph::new();
    let ids = chain(&graph, &["life", "Eukaryota", "Metazoa"]);

    let mut writer = BatchWriter::new(&graph, 2);
    for id in &ids {
        writer.set_property(*id, "visited", true).unwrap();
    }
    // Two ops were flushed automatically, one is still pending
    assert_eq!(writer.commits(), 1);
    assert_eq!(writer.pending(), 1);
    assert_eq!(graph.property(ids[2], "visited").unwrap(), None);

    let stats = writer.finish().unwrap();
    assert_eq!(stats.operations, 3);
    assert_eq!(
        graph.property(ids[2], "visited").unwrap(),
        Some(PropertyValue::Bool(true))
    );
}

#[test]
fn test_failed_flush_keeps_earlier_commits() {
    let graph = MemoryGraph::new();
    let ids = chain(&graph, &["life"]);

    let mut writer = BatchWriter::new(&graph, 10);
    writer.set_metadata("version", "3.6").unwrap();
    writer.flush().unwrap();
    writer.set_property(NodeId(42), "name", "ghost").unwrap();
    let err = writer.flush().unwrap_err();

    assert!(matches!(err, TaxomatchError::Storage(_)));
    assert_eq!(
        graph.metadata("version").unwrap(),
        Some(PropertyValue::from("3.6"))
    );
    assert!(graph.property(ids[0], "name").unwrap().is_some());
}

#[test]
fn test_edges_follow_direction() {
    let graph = MemoryGraph::new();
    let ids = chain(&graph, &["life", "Eukaryota", "Metazoa"]);

    let parent = graph
        .first_edge(ids[2], EdgeKind::ChildOf, Direction::Outgoing)
        .unwrap()
        .map(|e| e.to);
    assert_eq!(parent, Some(ids[1]));

    let children: Vec<NodeId> = graph
        .edges(ids[0], EdgeKind::ChildOf, Direction::Incoming)
        .unwrap()
        .into_iter()
        .map(|e| e.from)
        .collect();
    assert_eq!(children, vec![ids[1]]);
}

#[rstest]
#[case("Metazoa", 0.5, true)]
#[case("Metazoe", 0.8, true)]
#[case("Metazo", 0.8, true)]
#[case("Protozoa", 0.8, false)]
#[case("Mammalia", 0.5, false)]
fn test_fuzzy_lookup(#[case] query: &str, #[case] min_similarity: f64, #[case] found: bool) {
    let graph = MemoryGraph::new();
    let ids = chain(&graph, &["life", "Eukaryota", "Metazoa"]);

    let hits = graph
        .fuzzy_lookup(&name_index(), query, min_similarity)
        .unwrap();
    assert_eq!(hits.iter().any(|h| h.node == ids[2]), found);
}

#[test]
fn test_prefix_lookup_reports_keys() {
    let graph = MemoryGraph::new();
    chain(&graph, &["life", "Eukaryota", "Euglena", "Metazoa"]);

    let keys: Vec<String> = graph
        .prefix_lookup(&name_index(), "Eu")
        .unwrap()
        .into_iter()
        .map(|h| h.key)
        .collect();
    assert_eq!(keys, vec!["euglena".to_string(), "eukaryota".to_string()]);
}

#[test]
fn test_concurrent_readers_see_committed_state() {
    let graph = Arc::new(MemoryGraph::new());
    let ids = chain(&graph, &["life", "Eukaryota", "Metazoa"]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let graph = Arc::clone(&graph);
            thread::spawn(move || graph.exact_lookup(&name_index(), "metazoa").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![ids[2]]);
    }
}

#[test]
fn test_metadata_serializes_to_json() {
    let graph = MemoryGraph::new();
    let mut batch = WriteBatch::new();
    batch.set_metadata("version", "3.6");
    batch.set_metadata("complete", true);
    graph.commit(batch).unwrap();

    let entries = graph.metadata_entries().unwrap();
    let json = serde_json::to_value(&entries).unwrap();
    assert_eq!(
        json,
        serde_json::json!([["complete", {"Bool": true}], ["version", {"Text": "3.6"}]])
    );
}
