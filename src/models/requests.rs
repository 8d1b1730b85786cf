//! Request DTOs for the gateway API
//!
//! Defines path and query inputs accepted by the HTTP endpoints.

use serde::Deserialize;

/// Maximum collection name length in bytes
pub const MAX_COLLECTION_NAME_LENGTH: usize = 64;

/// Query string for DELETE /cache
///
/// # Fields
/// - `pattern`: literal substring; every key containing it is invalidated.
///   Absent means clear everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl InvalidateQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.pattern {
            Some(pattern) if pattern.is_empty() => {
                Some("Pattern cannot be empty; omit it to clear the cache".to_string())
            }
            _ => None,
        }
    }
}

/// Validates a backend collection name taken from the path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_collection_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("Collection name cannot be empty".to_string());
    }
    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Some(format!(
            "Collection name exceeds maximum length of {} characters",
            MAX_COLLECTION_NAME_LENGTH
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Some("Collection name may only contain letters, digits, '_' and '-'".to_string());
    }
    None
}

/// Cache key under which a collection listing is stored.
pub fn collection_key(name: &str) -> String {
    format!("{}-list", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_query_deserialize() {
        let query: InvalidateQuery = serde_json::from_str(r#"{"pattern": "labs"}"#).unwrap();
        assert_eq!(query.pattern.as_deref(), Some("labs"));

        let query: InvalidateQuery = serde_json::from_str("{}").unwrap();
        assert!(query.pattern.is_none());
    }

    #[test]
    fn test_validate_empty_pattern() {
        let query = InvalidateQuery {
            pattern: Some(String::new()),
        };
        assert!(query.validate().is_some());
        assert!(InvalidateQuery::default().validate().is_none());
    }

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("labs").is_none());
        assert!(validate_collection_name("cultural_assets-2").is_none());
        assert!(validate_collection_name("").is_some());
        assert!(validate_collection_name("labs?select=*").is_some());
        assert!(validate_collection_name(&"x".repeat(MAX_COLLECTION_NAME_LENGTH + 1)).is_some());
    }

    #[test]
    fn test_collection_key() {
        assert_eq!(collection_key("labs"), "labs-list");
    }
}
