//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of an opaque record identifier.
pub const MAX_ID_LENGTH: usize = 128;

/// Maximum length of a rejection reason.
pub const MAX_REASON_LENGTH: usize = 1000;

/// Error code reported for a missing or blank required field.
pub const REQUIRED: &str = "required";

/// Validates that an identifier is present, not blank, and reasonably short.
pub fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new(REQUIRED);
        err.message = Some("Identifier is required".into());
        return Err(err);
    }
    if value.len() > MAX_ID_LENGTH {
        let mut err = ValidationError::new("identifier_length");
        err.message = Some(format!("Identifier cannot exceed {} characters", MAX_ID_LENGTH).into());
        return Err(err);
    }
    Ok(())
}

/// Validates a rejection reason: not blank and bounded in length.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        let mut err = ValidationError::new("reason_required");
        err.message = Some("Rejection reason cannot be blank".into());
        return Err(err);
    }
    if reason.chars().count() > MAX_REASON_LENGTH {
        let mut err = ValidationError::new("reason_length");
        err.message = Some(
            format!("Rejection reason cannot exceed {} characters", MAX_REASON_LENGTH).into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Returns the trimmed value when it is not blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
