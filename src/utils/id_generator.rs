//! Random identifiers for listings, likes and comments.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Random bytes per identifier; 12 bytes encode to 16 characters.
const ID_LENGTH_BYTES: usize = 12;

/// Generates a random URL-safe identifier.
///
/// Uses `getrandom` for entropy and URL-safe base64 without padding.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_id() -> Result<String, AppError> {
    let mut buffer = [0u8; ID_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate identifier",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Checks that a path-supplied id could have been produced by [`generate_id`]
/// or by an import (`1..=64` URL-safe characters).
///
/// # Errors
///
/// Returns [`AppError::Validation`] for empty, oversized or non URL-safe ids.
pub fn validate_id(id: &str) -> Result<(), AppError> {
    let well_formed = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !well_formed {
        return Err(AppError::bad_request(
            "Invalid identifier",
            json!({ "id": id }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_length_and_alphabet() {
        let id = generate_id().unwrap();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!id.contains('='));
    }

    #[test]
    fn test_generate_id_produces_unique_ids() {
        let ids: HashSet<_> = (0..1000).map(|_| generate_id().unwrap()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_ids_validate() {
        let id = generate_id().unwrap();
        assert!(validate_id(&id).is_ok());
    }

    #[test]
    fn test_validate_id_rejects_bad_input() {
        assert!(validate_id("").is_err());
        assert!(validate_id("has space").is_err());
        assert!(validate_id("../etc").is_err());
        assert!(validate_id(&"a".repeat(65)).is_err());
        assert!(validate_id("legacy-id_42").is_ok());
    }
}
