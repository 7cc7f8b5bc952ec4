//! Error types for mongoref

use thiserror::Error;

/// Result type alias for mongoref operations
pub type Result<T> = std::result::Result<T, MongoRefError>;

/// Unified error type for all mongoref operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MongoRefError {
    /// No document matched the reference. Recoverable; the caller picks a fallback.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The referenced collection does not exist (strict resolution only)
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Store unreachable: I/O, server selection, DNS or pool failures
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MongoRefError {
    /// Build a `NotFound` error for a collection/id pair
    pub fn not_found(collection: impl Into<String>, id: impl ToString) -> Self {
        MongoRefError::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Returns true if no document matched
    pub fn is_not_found(&self) -> bool {
        matches!(self, MongoRefError::NotFound { .. })
    }

    /// Returns true if this error is potentially retryable.
    ///
    /// Nothing in mongoref retries; this only tells callers which failures
    /// are transient infrastructure problems.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MongoRefError::Connection(_))
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for MongoRefError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match err.kind.as_ref() {
            ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => {
                MongoRefError::Connection(err.to_string())
            }
            ErrorKind::InvalidArgument { .. } => MongoRefError::Validation(err.to_string()),
            ErrorKind::BsonDeserialization(_) => MongoRefError::Deserialization(err.to_string()),
            ErrorKind::BsonSerialization(_) => MongoRefError::Serialization(err.to_string()),
            _ => MongoRefError::MongoDB(err.to_string()),
        }
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for MongoRefError {
    fn from(err: bson::ser::Error) -> Self {
        MongoRefError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for MongoRefError {
    fn from(err: bson::de::Error) -> Self {
        MongoRefError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = MongoRefError::not_found("modules", "m1");
        assert_eq!(err.to_string(), "Document not found: modules/m1");
    }

    #[test]
    fn test_error_display_collection_not_found() {
        let err = MongoRefError::CollectionNotFound("modules".to_string());
        assert_eq!(err.to_string(), "Collection not found: modules");
    }

    #[test]
    fn test_error_display_connection() {
        let err = MongoRefError::Connection("timeout".to_string());
        assert_eq!(err.to_string(), "Connection error: timeout");
    }

    #[test]
    fn test_error_display_mongodb() {
        let err = MongoRefError::MongoDB("command failed".to_string());
        assert_eq!(err.to_string(), "MongoDB error: command failed");
    }

    #[test]
    fn test_error_display_validation() {
        let err = MongoRefError::Validation("collection name cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: collection name cannot be empty"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = MongoRefError::Config("missing uri".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing uri");
    }

    #[test]
    fn test_is_not_found() {
        assert!(MongoRefError::not_found("modules", "x").is_not_found());
        assert!(!MongoRefError::CollectionNotFound("modules".to_string()).is_not_found());
        assert!(!MongoRefError::Connection("down".to_string()).is_not_found());
    }

    #[test]
    fn test_is_retryable() {
        assert!(MongoRefError::Connection("test".to_string()).is_retryable());
        assert!(!MongoRefError::MongoDB("test".to_string()).is_retryable());
        assert!(!MongoRefError::not_found("c", "i").is_retryable());
        assert!(!MongoRefError::CollectionNotFound("c".to_string()).is_retryable());
    }
}
