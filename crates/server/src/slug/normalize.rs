/// Maps arbitrary text onto a lowercase kebab-case slug candidate.
///
/// The input is lowercased and trimmed, whitespace runs become a single
/// hyphen, everything outside `[a-z0-9-]` is dropped, hyphen runs collapse to
/// one, and a leading and trailing hyphen are stripped.
///
/// This never fails. Input without any ASCII letters or digits yields an
/// empty string, which callers must reject before probing for availability.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut last_was_dash = false;

    for ch in lowered.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !last_was_dash {
                slug.push('-');
                last_was_dash = true;
            }
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_was_dash = false;
        }
        // Dropped characters must not reset `last_was_dash`: "a-!-b" collapses to "a-b".
    }

    let slug = slug.strip_prefix('-').unwrap_or(&slug);
    let slug = slug.strip_suffix('-').unwrap_or(slug);
    slug.to_string()
}

/// Returns `candidate` without its trailing run of ASCII digits.
pub fn strip_numeric_suffix(candidate: &str) -> &str {
    candidate.trim_end_matches(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(slug: &str) -> bool {
        slug.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
    }

    #[test]
    fn normalizes_mixed_punctuation_and_spacing() {
        assert_eq!(normalize("  My Team!! Space  "), "my-team-space");
    }

    #[test]
    fn punctuation_only_normalizes_to_empty() {
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(" - - "), "");
    }

    #[test]
    fn collapses_hyphens_left_by_removed_characters() {
        assert_eq!(normalize("a - b"), "a-b");
        assert_eq!(normalize("a-!-b"), "a-b");
        assert_eq!(normalize("--alpha--beta--"), "alpha-beta");
    }

    #[test]
    fn whitespace_runs_become_single_hyphen() {
        assert_eq!(normalize("hello \t\n world"), "hello-world");
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!(normalize("Café Münster"), "caf-mnster");
        assert_eq!(normalize("東京 office"), "office");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("Team 42"), "team-42");
        assert_eq!(normalize("2024"), "2024");
    }

    #[test]
    fn is_idempotent_and_well_formed() {
        let inputs = [
            "",
            "!!!",
            "  My Team!! Space  ",
            "-leading",
            "trailing-",
            "__under_score__",
            "a  --  b",
            "UPPER lower 123",
            "emoji 🚀 launch",
            "tabs\tand\nnewlines",
            "-!-",
            "already-a-slug",
        ];

        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
            assert!(is_well_formed(&once), "malformed {once:?} from {input:?}");
        }
    }

    #[test]
    fn strips_trailing_digit_run_only() {
        assert_eq!(strip_numeric_suffix("team42"), "team");
        assert_eq!(strip_numeric_suffix("team"), "team");
        assert_eq!(strip_numeric_suffix("team-7"), "team-");
        assert_eq!(strip_numeric_suffix("4team2"), "4team");
        assert_eq!(strip_numeric_suffix("123"), "");
    }
}
