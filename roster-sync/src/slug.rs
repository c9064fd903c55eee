//! URL-safe slugs for new roster entries.

/// Upper bound on slug length, in characters.
pub const MAX_SLUG_LEN: usize = 96;

/// Lower-case `name`, drop everything but ASCII alphanumerics, whitespace and
/// hyphens, collapse whitespace runs into single hyphens, and truncate.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("-");
    let truncated: String = joined.chars().take(MAX_SLUG_LEN).collect();
    truncated.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Jane Doe", "jane-doe")]
    #[case("  Mary-Kate   O'Neil ", "mary-kate-oneil")]
    #[case("José Núñez", "jos-nez")]
    #[case("Dr. J. R. Smith, III", "dr-j-r-smith-iii")]
    #[case("", "")]
    fn slug_cases(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(slugify(name), expected);
    }

    #[test]
    fn slug_is_bounded_and_does_not_end_in_hyphen() {
        let long = format!("{} tail", "a".repeat(95));
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }
}
