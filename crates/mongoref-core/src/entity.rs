//! Entity capability trait
//!
//! Any document type carrying a caller-assigned identifier can be stored and
//! resolved. The identifier is a capability (`id` / `set_id`), not a base type.

use bson::{Bson, Document as BsonDocument};
use mongoref_common::{MongoRefError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Identifier types usable as an entity id.
///
/// Implemented for every type that converts into BSON and prints itself,
/// which covers `bson::Uuid`, `ObjectId` and `String`.
pub trait EntityId:
    Clone
    + Into<Bson>
    + Serialize
    + DeserializeOwned
    + fmt::Display
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> EntityId for T where
    T: Clone
        + Into<Bson>
        + Serialize
        + DeserializeOwned
        + fmt::Display
        + fmt::Debug
        + Send
        + Sync
        + 'static
{
}

/// A persisted record with a unique identifier.
///
/// # Example
///
/// ```
/// use bson::Uuid;
/// use mongoref_core::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Module {
///     #[serde(rename = "_id")]
///     id: Uuid,
///     name: String,
/// }
///
/// impl Entity for Module {
///     type Id = Uuid;
///
///     fn id(&self) -> &Uuid {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: Uuid) {
///         self.id = id;
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// Identifier type, assigned by the caller at creation time
    type Id: EntityId;

    /// Field holding the identifier in the stored document
    const ID_FIELD: &'static str = "_id";

    /// Get the entity's identifier
    fn id(&self) -> &Self::Id;

    /// Replace the entity's identifier
    fn set_id(&mut self, id: Self::Id);

    /// Convert entity to BSON
    fn to_bson(&self) -> Result<BsonDocument> {
        bson::to_document(self).map_err(|e| MongoRefError::Serialization(e.to_string()))
    }

    /// Create entity from BSON
    fn from_bson(doc: BsonDocument) -> Result<Self> {
        bson::from_document(doc).map_err(|e| MongoRefError::Deserialization(e.to_string()))
    }
}
