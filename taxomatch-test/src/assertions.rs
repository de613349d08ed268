//! Custom assertions for testing

use std::collections::BTreeSet;
use std::fmt::Debug;

use taxomatch_core::NodeId;
use taxomatch_storage::{IndexName, TaxonStore};

/// Assert that two id lists hold the same members, ignoring order
pub fn assert_same_members(actual: &[NodeId], expected: &[NodeId]) {
    let actual_set: BTreeSet<_> = actual.iter().collect();
    let expected_set: BTreeSet<_> = expected.iter().collect();
    assert_eq!(
        actual_set, expected_set,
        "Member sets differ (actual {:?}, expected {:?})",
        actual, expected
    );
}

/// Assert that `index` maps `key` to `node`
pub fn assert_indexed(store: &dyn TaxonStore, index: &IndexName, key: &str, node: NodeId) {
    let hits = store.exact_lookup(index, key).expect("index lookup failed");
    assert!(
        hits.contains(&node),
        "Expected {} under '{}' in {}, found {:?}",
        node,
        key,
        index,
        hits
    );
}

/// Assert that `index` does not map `key` to `node`
pub fn assert_not_indexed(store: &dyn TaxonStore, index: &IndexName, key: &str, node: NodeId) {
    let hits = store.exact_lookup(index, key).expect("index lookup failed");
    assert!(
        !hits.contains(&node),
        "Did not expect {} under '{}' in {}",
        node,
        key,
        index
    );
}

/// Assert that `items` is ordered by the key `f` extracts
pub fn assert_sorted_by<T, K, F>(items: &[T], f: F)
where
    K: PartialOrd + Debug,
    F: Fn(&T) -> K,
{
    for pair in items.windows(2) {
        let (a, b) = (f(&pair[0]), f(&pair[1]));
        assert!(a <= b, "Items out of order: {:?} before {:?}", a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_members_ignores_order() {
        assert_same_members(&[NodeId(2), NodeId(1)], &[NodeId(1), NodeId(2)]);
    }

    #[test]
    #[should_panic(expected = "Member sets differ")]
    fn test_same_members_detects_difference() {
        assert_same_members(&[NodeId(2)], &[NodeId(1)]);
    }

    #[test]
    fn test_sorted_by() {
        assert_sorted_by(&["a", "bb", "ccc"], |s| s.len());
    }
}
