//! Name validation for collections and databases
//!
//! References are plain data and may come straight out of stored documents,
//! so every name is checked before it reaches a store.

use crate::Result;
use mongoref_common::MongoRefError;
use tracing::warn;

/// Maximum allowed length for collection names (MongoDB limit is 255, we're more conservative)
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// Maximum allowed length for database names
const MAX_DATABASE_NAME_LENGTH: usize = 64;

/// Characters MongoDB rejects in database names
const INVALID_DATABASE_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// Validated collection name
///
/// # Guarantees
/// - Not empty
/// - Maximum 120 characters
/// - No null bytes
/// - No "system." prefix (system collections)
/// - No $ characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName {
    name: String,
}

impl CollectionName {
    /// Creates a new validated collection name
    ///
    /// # Errors
    /// Returns `Validation` if:
    /// - Name is empty
    /// - Name exceeds MAX_COLLECTION_NAME_LENGTH
    /// - Name contains null bytes
    /// - Name starts with "system."
    /// - Name contains $ characters
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(MongoRefError::Validation(
                "Collection name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_COLLECTION_NAME_LENGTH {
            return Err(MongoRefError::Validation(format!(
                "Collection name exceeds maximum length of {} characters: '{}'",
                MAX_COLLECTION_NAME_LENGTH, name
            )));
        }

        if name.contains('\0') {
            return Err(MongoRefError::Validation(
                "Collection name cannot contain null bytes".to_string(),
            ));
        }

        if name.starts_with("system.") {
            return Err(MongoRefError::Validation(format!(
                "Collection name cannot start with 'system.' (reserved): '{}'",
                name
            )));
        }

        if name.contains('$') {
            return Err(MongoRefError::Validation(format!(
                "Collection name cannot contain '$' character: '{}'",
                name
            )));
        }

        // Allowed, but rarely intended
        if name.contains("..") || name.contains("//") {
            warn!(collection = name, "collection name contains suspicious pattern");
        }

        Ok(CollectionName {
            name: name.to_string(),
        })
    }

    /// Returns the validated collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Consumes the CollectionName and returns the inner String
    pub fn into_string(self) -> String {
        self.name
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validates a database name against the MongoDB naming rules
pub fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MongoRefError::Validation(
            "Database name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_DATABASE_NAME_LENGTH {
        return Err(MongoRefError::Validation(format!(
            "Database name exceeds maximum length of {} characters: '{}'",
            MAX_DATABASE_NAME_LENGTH, name
        )));
    }

    if let Some(c) = name.chars().find(|c| INVALID_DATABASE_CHARS.contains(c)) {
        return Err(MongoRefError::Validation(format!(
            "Database name cannot contain {:?}: '{}'",
            c, name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_collection_names() {
        assert!(CollectionName::new("modules").is_ok());
        assert!(CollectionName::new("projects_2024").is_ok());
        assert!(CollectionName::new("app.projects").is_ok());
    }

    #[test]
    fn test_empty_collection_name() {
        let err = CollectionName::new("").unwrap_err();
        assert!(matches!(err, MongoRefError::Validation(_)));
    }

    #[test]
    fn test_collection_name_too_long() {
        let name = "a".repeat(MAX_COLLECTION_NAME_LENGTH + 1);
        assert!(CollectionName::new(&name).is_err());

        let name = "a".repeat(MAX_COLLECTION_NAME_LENGTH);
        assert!(CollectionName::new(&name).is_ok());
    }

    #[test]
    fn test_collection_name_rejects_reserved() {
        assert!(CollectionName::new("system.users").is_err());
        assert!(CollectionName::new("mod$ules").is_err());
        assert!(CollectionName::new("mod\0ules").is_err());
    }

    #[test]
    fn test_collection_name_accessors() {
        let name = CollectionName::new("modules").unwrap();
        assert_eq!(name.as_str(), "modules");
        assert_eq!(name.as_ref(), "modules");
        assert_eq!(name.to_string(), "modules");
        assert_eq!(name.into_string(), "modules".to_string());
    }

    #[test]
    fn test_database_names() {
        assert!(validate_database_name("i18nMgr").is_ok());
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name("my.db").is_err());
        assert!(validate_database_name("my db").is_err());
        assert!(validate_database_name(&"d".repeat(65)).is_err());
    }
}
