//! # Validation
//!
//! Secret id checks run before any Secret Manager call.

use super::ManagerError;
use anyhow::Result;
use regex::Regex;

/// Maximum secret id length accepted by Secret Manager
const MAX_SECRET_ID_LEN: usize = 255;

/// Validate a secret id
/// Format: alphanumeric, hyphens, underscores
/// Length: 1-255 characters
pub fn validate_secret_id(secret_id: &str) -> Result<()> {
    let invalid = |reason: String| ManagerError::InvalidSecretId {
        secret_id: secret_id.to_string(),
        reason,
    };

    if secret_id.is_empty() {
        return Err(invalid("secret id cannot be empty".to_string()).into());
    }

    if secret_id.len() > MAX_SECRET_ID_LEN {
        return Err(invalid(format!(
            "exceeds maximum length of {MAX_SECRET_ID_LEN} characters (got {})",
            secret_id.len()
        ))
        .into());
    }

    let secret_regex = Regex::new(r"^[A-Za-z0-9_-]+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    if !secret_regex.is_match(secret_id) {
        return Err(invalid(
            "must contain only alphanumeric characters, hyphens, and underscores".to_string(),
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_secret_ids() {
        let longest = "x".repeat(255);
        for id in ["database-url", "JWT_SECRET", "a", longest.as_str()] {
            assert!(validate_secret_id(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_invalid_secret_ids() {
        let too_long = "x".repeat(256);
        for id in ["", "db.url", "db url", "projects/p/secrets/db", too_long.as_str()] {
            let err = validate_secret_id(id).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ManagerError>(),
                    Some(ManagerError::InvalidSecretId { .. })
                ),
                "{id:?} should be rejected"
            );
        }
    }
}
