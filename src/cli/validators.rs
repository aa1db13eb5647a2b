//! CLI argument validators.

/// Parse a source locator, rejecting blank values.
pub fn parse_source(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("source must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}
