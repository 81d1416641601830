use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters,
    /// underscores, dots or hyphens
    /// - Valid: "john_doe", "user123", "_admin", "jane.doe", "civic-hero"
    /// - Invalid: "123user", "-user", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.-]*$").unwrap();
}

/// Trims a submitted string, mapping blank input to `None`
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
