//! Edit budgets and scores for approximate matches

/// Edits tolerated for a query of `len` characters
pub fn max_edits(len: usize) -> usize {
    match len {
        0..=8 => 1,
        9..=13 => 2,
        14..=18 => 3,
        _ => 4,
    }
}

/// Similarity a fuzzy index hit must exceed for a query of `len` characters
pub fn min_similarity(len: usize) -> f64 {
    if len == 0 {
        return 1.0;
    }
    let len = len as f64;
    ((len - (max_edits(len as usize) as f64 + 1.0)) / len).max(0.0)
}

/// Score of a hit `distance` edits away: `(min(len) - distance) / min(len)`
pub fn edit_score(query: &str, key: &str, distance: usize) -> f64 {
    let shortest = query.chars().count().min(key.chars().count());
    if shortest == 0 {
        return 0.0;
    }
    (shortest.saturating_sub(distance)) as f64 / shortest as f64
}

/// Penalty for a match `internodal_distance` edges away from the query's LICA, at most 1
pub fn distance_modifier(internodal_distance: usize) -> f64 {
    if internodal_distance < 2 {
        return 1.0;
    }
    (1.0 / (internodal_distance as f64).ln()).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4, 1)]
    #[case(8, 1)]
    #[case(9, 2)]
    #[case(13, 2)]
    #[case(14, 3)]
    #[case(18, 3)]
    #[case(19, 4)]
    #[case(40, 4)]
    fn test_max_edits(#[case] len: usize, #[case] expected: usize) {
        assert_eq!(max_edits(len), expected);
    }

    #[test]
    fn test_min_similarity_admits_budget() {
        // One edit in a 12 character name scores 11/12, above (12 - 3) / 12
        assert!(1.0 - 1.0 / 12.0 > min_similarity(12));
        assert_eq!(min_similarity(2), 0.0);
        assert_eq!(min_similarity(0), 1.0);
    }

    #[test]
    fn test_edit_score() {
        assert_eq!(edit_score("gorila gorilla", "gorilla gorilla", 1), 13.0 / 14.0);
        assert_eq!(edit_score("homo", "homo", 0), 1.0);
        assert_eq!(edit_score("", "homo", 4), 0.0);
    }

    #[test]
    fn test_distance_modifier() {
        assert_eq!(distance_modifier(0), 1.0);
        assert_eq!(distance_modifier(2), 1.0);
        assert!((distance_modifier(4) - 1.0 / 4f64.ln()).abs() < 1e-12);
        assert!(distance_modifier(10) < distance_modifier(4));
    }
}
