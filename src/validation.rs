use crate::constants::MAX_TIMEOUT_MINUTES;
use crate::error::AppError;
use crate::models::ProtectedDomains;

/// Validate a total inactivity limit in minutes.
pub fn validate_timeout_minutes(total: i64) -> Result<i64, AppError> {
    if total <= 0 {
        return Err(AppError::InvalidInput {
            field: "timeout",
            reason: "must be positive".into(),
        });
    }
    if total > MAX_TIMEOUT_MINUTES {
        return Err(AppError::InvalidInput {
            field: "timeout",
            reason: format!("cannot exceed {MAX_TIMEOUT_MINUTES} minutes"),
        });
    }
    Ok(total)
}

/// Validate protected domain entries. Blank lines are ignored; an entry with
/// a scheme, a path, or no dot is rejected.
pub fn validate_protected_domains<S: AsRef<str>>(
    entries: &[S],
) -> Result<ProtectedDomains, AppError> {
    let invalid: Vec<&str> = entries
        .iter()
        .map(|e| e.as_ref().trim())
        .filter(|e| !e.is_empty())
        .filter(|e| e.contains("://") || e.contains('/') || !e.contains('.'))
        .collect();

    if !invalid.is_empty() {
        return Err(AppError::InvalidInput {
            field: "protected_domains",
            reason: invalid.join(", "),
        });
    }

    Ok(ProtectedDomains::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timeout_in_range() {
        assert_eq!(validate_timeout_minutes(1).unwrap(), 1);
        assert_eq!(validate_timeout_minutes(120).unwrap(), 120);
        assert_eq!(validate_timeout_minutes(MAX_TIMEOUT_MINUTES).unwrap(), MAX_TIMEOUT_MINUTES);
    }

    #[test]
    fn test_validate_timeout_zero() {
        assert!(validate_timeout_minutes(0).is_err());
        assert!(validate_timeout_minutes(-30).is_err());
    }

    #[test]
    fn test_validate_timeout_too_large() {
        assert!(validate_timeout_minutes(MAX_TIMEOUT_MINUTES + 1).is_err());
    }

    #[test]
    fn test_validate_protected_domains_valid() {
        let domains =
            validate_protected_domains(&["example.com", "", "  Docs.rs  ", "example.com"]).unwrap();
        assert_eq!(domains.as_slice(), &["example.com", "docs.rs"]);
    }

    #[test]
    fn test_validate_protected_domains_invalid() {
        let err = validate_protected_domains(&["https://example.com", "localhost", "a.com/path"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid protected_domains: https://example.com, localhost, a.com/path"
        );
    }
}
