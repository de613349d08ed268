//! Case-insensitive text index supporting exact, prefix and edit-distance lookups
use std::collections::BTreeMap;

use taxomatch_core::NodeId;

use crate::core::IndexHit;

#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    entries: BTreeMap<String, Vec<NodeId>>,
    postings: usize,
}

/// Keys are stored and queried lowercased
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// `1 - distance / min(len(a), len(b))`, counted in chars
pub fn similarity(distance: usize, a_len: usize, b_len: usize) -> f64 {
    let shorter = a_len.min(b_len);
    if shorter == 0 {
        return if distance == 0 { 1.0 } else { f64::NEG_INFINITY };
    }
    1.0 - distance as f64 / shorter as f64
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node` under `key`. Re-adding the same pair is a no-op.
    /// Returns whether a new posting was stored.
    pub fn add(&mut self, key: &str, node: NodeId) -> bool {
        let key = normalize_key(key);
        if key.is_empty() {
            return false;
        }
        let nodes = self.entries.entry(key).or_default();
        if nodes.contains(&node) {
            return false;
        }
        nodes.push(node);
        self.postings += 1;
        true
    }

    pub fn exact(&self, key: &str) -> Vec<NodeId> {
        self.entries
            .get(&normalize_key(key))
            .cloned()
            .unwrap_or_default()
    }

    pub fn prefix(&self, prefix: &str) -> Vec<IndexHit> {
        let prefix = normalize_key(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }

        self.entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .flat_map(|(key, nodes)| {
                nodes.iter().map(move |node| IndexHit {
                    node: *node,
                    key: key.clone(),
                    distance: 0,
                })
            })
            .collect()
    }

    pub fn fuzzy(&self, query: &str, min_similarity: f64) -> Vec<IndexHit> {
        let query = normalize_key(query);
        let query_len = query.chars().count();
        if query_len == 0 {
            return Vec::new();
        }

        let mut hits: Vec<IndexHit> = Vec::new();
        for (key, nodes) in &self.entries {
            let key_len = key.chars().count();

            // The length difference bounds the distance from below
            let floor = query_len.abs_diff(key_len);
            if similarity(floor, query_len, key_len) <= min_similarity {
                continue;
            }

            let distance = strsim::levenshtein(&query, key);
            if similarity(distance, query_len, key_len) <= min_similarity {
                continue;
            }

            hits.extend(nodes.iter().map(|node| IndexHit {
                node: *node,
                key: key.clone(),
                distance,
            }));
        }

        hits.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));
        hits
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (key, node) pairs
    pub fn postings(&self) -> usize {
        self.postings
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.postings = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> TextIndex {
        let mut index = TextIndex::new();
        index.add("Homo sapiens", NodeId(1));
        index.add("Homo", NodeId(2));
        index.add("Homo erectus", NodeId(3));
        index.add("Hominidae", NodeId(4));
        index.add("Aotus", NodeId(5));
        index.add("Aotus", NodeId(6));
        index
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let index = sample();
        assert_eq!(index.exact("HOMO SAPIENS"), vec![NodeId(1)]);
        assert_eq!(index.exact("aotus"), vec![NodeId(5), NodeId(6)]);
        assert!(index.exact("Pan").is_empty());
    }

    #[test]
    fn test_duplicate_postings_are_ignored() {
        let mut index = sample();
        assert!(!index.add("homo", NodeId(2)));
        assert_eq!(index.postings(), 6);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_prefix_ordered_by_key() {
        let index = sample();
        let keys: Vec<String> = index.prefix("Homo").into_iter().map(|h| h.key).collect();
        assert_eq!(keys, vec!["homo", "homo erectus", "homo sapiens"]);
        assert_eq!(index.prefix("Homi").len(), 1);
        assert!(index.prefix("").is_empty());
    }

    #[test]
    fn test_fuzzy_finds_single_edit() {
        let index = sample();
        let hits = index.fuzzy("Homo sapienz", 0.8);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, NodeId(1));
        assert_eq!(hits[0].distance, 1);
    }

    #[test]
    fn test_fuzzy_orders_by_distance() {
        let index = sample();
        let hits = index.fuzzy("Homo erectis", 0.5);
        assert_eq!(hits[0].node, NodeId(3));
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_similarity_threshold_is_strict() {
        // one edit over five chars is exactly 0.8
        let index = sample();
        assert!(index.fuzzy("Aotis", 0.8).is_empty());
        assert_eq!(index.fuzzy("Aotis", 0.79).len(), 2);
    }

    proptest! {
        #[test]
        fn prop_exact_returns_inserted_node(key in "[a-z]{1,12}( [a-z]{1,12})?", id in 0u32..1000) {
            let mut index = TextIndex::new();
            index.add(&key, NodeId(id));
            prop_assert!(index.exact(&key.to_uppercase()).contains(&NodeId(id)));
            prop_assert!(index.prefix(&key).iter().any(|h| h.node == NodeId(id)));
            prop_assert!(index.fuzzy(&key, 0.0).iter().any(|h| h.node == NodeId(id) && h.distance == 0));
        }
    }
}
