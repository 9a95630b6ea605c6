use crate::error::{ServiceError, ServiceResult};

/// Checks that `slug` is non-empty lowercase kebab-case no longer than
/// `max_length` bytes.
pub fn validate_slug(slug: &str, max_length: usize) -> ServiceResult<()> {
    if slug.is_empty() {
        return Err(ServiceError::validation(
            "slug must contain at least one letter or digit",
        ));
    }

    let is_valid = !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !is_valid {
        return Err(ServiceError::validation("slug must be lowercase kebab-case"));
    }

    if slug.len() > max_length {
        return Err(ServiceError::validation(format!(
            "slug must be at most {max_length} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_kebab_case() {
        assert!(validate_slug("my-team-2", 255).is_ok());
        assert!(validate_slug("a", 255).is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            validate_slug("", 255),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed() {
        for slug in ["-team", "team-", "te--am", "Team", "team_1", "tëam"] {
            assert!(validate_slug(slug, 255).is_err(), "{slug} should be rejected");
        }
    }

    #[test]
    fn rejects_overlong() {
        assert!(validate_slug("abcdef", 5).is_err());
        assert!(validate_slug("abcde", 5).is_ok());
    }
}
