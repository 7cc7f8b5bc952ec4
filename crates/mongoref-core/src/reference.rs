//! Cross-collection document references
//!
//! A [`DocumentReference`] names a document in another collection without
//! embedding it. It is a weak reference: resolving it is a lookup, and the
//! target's lifetime is not tied to the document holding the reference.
//! Serialised with the DBRef field names so the driver and shell recognise it:
//!
//! ```text
//! { "$ref": "modules", "$id": <id>, "$db": "i18nMgr" }
//! ```

use crate::entity::{Entity, EntityId};
use crate::store::Namespace;
use crate::validation::{validate_database_name, CollectionName};
use crate::Result;
use bson::Uuid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a document by collection name and id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReference<I = Uuid> {
    #[serde(rename = "$ref")]
    collection: String,
    #[serde(rename = "$id")]
    id: I,
    #[serde(rename = "$db", default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
}

impl<I: EntityId> DocumentReference<I> {
    /// Create a reference into `collection` in the store's default database
    pub fn new(collection: &str, id: I) -> Result<Self> {
        let collection = CollectionName::new(collection)?;
        Ok(Self {
            collection: collection.into_string(),
            id,
            database: None,
        })
    }

    /// Create a reference pointing at an existing entity
    pub fn to<T>(collection: &str, entity: &T) -> Result<Self>
    where
        T: Entity<Id = I>,
    {
        Self::new(collection, entity.id().clone())
    }

    /// Point the reference at an explicit database
    pub fn in_database(mut self, database: &str) -> Result<Self> {
        validate_database_name(database)?;
        self.database = Some(database.to_string());
        Ok(self)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Validated namespace this reference points into.
    ///
    /// References read back from storage bypass the constructors, so the
    /// names are checked again here.
    pub fn namespace(&self) -> Result<Namespace> {
        let namespace = Namespace::new(CollectionName::new(&self.collection)?);
        match &self.database {
            Some(database) => namespace.with_database(database),
            None => Ok(namespace),
        }
    }
}

impl<I: fmt::Display> fmt::Display for DocumentReference<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database {
            Some(database) => write!(f, "{}.{}/{}", database, self.collection, self.id),
            None => write!(f, "{}/{}", self.collection, self.id),
        }
    }
}
