//! Query name cleanup

/// Characters that never belong in a taxon name
const OFFENDING_CHARS: &[char] = &[
    '_', '~', '\\', '`', ':', ';', '/', '[', ']', '{', '}', '|', '<', '>', ',', '!', '@', '#',
    '$', '%', '^', '&', '*', '(', ')', '?', '+', '=',
];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || OFFENDING_CHARS.contains(&c)
}

/// Collapse runs of whitespace and offending characters into single spaces.
///
/// Periods, hyphens and apostrophes survive since they occur in real names
/// ("Homo sp.", "Abies x-borisii-regis", "Bacillus cereus 'group'").
pub fn scrub_name(name: &str) -> String {
    name.split(is_separator)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn scrub_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| scrub_name(n.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(scrub_name("  Homo    sapiens\t"), "Homo sapiens");
    }

    #[test]
    fn test_replaces_offending_characters() {
        assert_eq!(scrub_name("Homo_sapiens"), "Homo sapiens");
        assert_eq!(scrub_name("Pan (troglodytes)"), "Pan troglodytes");
        assert_eq!(scrub_name("Gorilla;;gorilla?"), "Gorilla gorilla");
    }

    #[test]
    fn test_keeps_name_punctuation() {
        assert_eq!(scrub_name("Homo sp."), "Homo sp.");
        assert_eq!(scrub_name("Abies x-borisii-regis"), "Abies x-borisii-regis");
        assert_eq!(scrub_name("Bacillus 'group'"), "Bacillus 'group'");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(scrub_name(""), "");
        assert_eq!(scrub_name("__//"), "");
        assert_eq!(scrub_names(&["a_b", " c "]), vec!["a b", "c"]);
    }
}
