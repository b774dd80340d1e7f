//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest participant name accepted, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// Validates a participant name: 1 to [`MAX_NAME_CHARS`] characters, no control characters.
///
/// Callers trim surrounding whitespace before validating.
///
/// # Examples
///
/// ```ignore
/// validate_participant_name("Red Team") // Ok
/// validate_participant_name("")         // Err - empty
/// validate_participant_name("Red\nTeam") // Err - control character
/// ```
pub fn validate_participant_name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_CHARS {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be between 1 and {MAX_NAME_CHARS} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("name_format");
        err.message = Some("Name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
