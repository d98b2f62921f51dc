//! Matter identifier validation.
//!
//! Identifiers become artifact file stems, so anything that could escape the
//! CCL directory is rejected before any I/O.

use crate::defaults::MATTER_ID_MAX_LEN;
use crate::error::{Error, Result};

/// Validate a matter identifier, returning it trimmed.
pub fn validate_matter_id(matter_id: &str) -> Result<&str> {
    let id = matter_id.trim();
    if id.is_empty() {
        return Err(Error::InvalidInput("matterId is required".to_string()));
    }
    if id.len() > MATTER_ID_MAX_LEN {
        return Err(Error::InvalidInput(format!(
            "matterId exceeds {} characters",
            MATTER_ID_MAX_LEN
        )));
    }
    if id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(Error::InvalidInput(
            "matterId must not contain path separators".to_string(),
        ));
    }
    if id.chars().any(char::is_control) {
        return Err(Error::InvalidInput(
            "matterId must not contain control characters".to_string(),
        ));
    }
    Ok(id)
}
