//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates a value used as (part of) a storage key: week ids and player ids.
///
/// Keys are embedded in swap request ids and URL paths, so they must not be blank
/// and must not contain `/` or control characters.
///
/// # Examples
///
/// ```ignore
/// validate_key_component("2024-05-12")       // Ok
/// validate_key_component("al@example.com")   // Ok
/// validate_key_component("   ")              // Err - blank
/// validate_key_component("2024/05/12")       // Err - slash
/// ```
pub fn validate_key_component(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("key_blank");
        err.message = Some("Identifier must not be blank".into());
        return Err(err);
    }

    if value.chars().any(|c| c == '/' || c.is_control()) {
        let mut err = ValidationError::new("key_format");
        err.message =
            Some("Identifier must not contain '/' or control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dates_and_emails() {
        assert!(validate_key_component("2024-05-12").is_ok());
        assert!(validate_key_component("al@example.com").is_ok());
        assert!(validate_key_component("B").is_ok());
    }

    #[test]
    fn rejects_blank_values() {
        assert!(validate_key_component("").is_err());
        assert!(validate_key_component("   ").is_err());
    }

    #[test]
    fn rejects_slashes_and_control_characters() {
        assert!(validate_key_component("2024/05/12").is_err());
        assert!(validate_key_component("al\nice").is_err());
        assert!(validate_key_component("tab\there").is_err());
    }
}
