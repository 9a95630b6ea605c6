use crate::error::{ServiceError, ServiceResult};

/// Upper bound on the raw `name` and `slug` fields of a request, in characters.
pub const MAX_FIELD_CHARS: usize = 255;

/// Trims a workspace name and checks it is 1 to 255 characters long.
pub fn validate_name(name: &str) -> ServiceResult<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_FIELD_CHARS {
        return Err(ServiceError::validation(
            "Workspace name is required (max 255 chars)",
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims an explicitly requested slug. Only `None` means "not supplied"; a
/// supplied slug must be 1 to 255 characters once trimmed.
pub fn validate_requested_slug(slug: Option<&str>) -> ServiceResult<Option<String>> {
    let Some(slug) = slug.map(str::trim) else {
        return Ok(None);
    };

    let len = slug.chars().count();
    if len == 0 || len > MAX_FIELD_CHARS {
        return Err(ServiceError::validation("Slug must be 1-255 characters"));
    }

    Ok(Some(slug.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_names() {
        assert_eq!(validate_name("  Research  ").unwrap(), "Research");
    }

    #[test]
    fn rejects_blank_and_long_names() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
        assert!(validate_name(&"é".repeat(255)).is_ok());
    }

    #[test]
    fn only_missing_slug_counts_as_absent() {
        assert_eq!(validate_requested_slug(None).unwrap(), None);
        assert_eq!(
            validate_requested_slug(Some(" My Slug ")).unwrap(),
            Some("My Slug".to_string())
        );
    }

    #[test]
    fn rejects_blank_slugs() {
        for blank in ["", "   ", "\t\n"] {
            let err = validate_requested_slug(Some(blank)).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{blank:?} accepted");
        }
    }

    #[test]
    fn rejects_long_slugs() {
        assert!(validate_requested_slug(Some(&"s".repeat(256))).is_err());
    }
}
