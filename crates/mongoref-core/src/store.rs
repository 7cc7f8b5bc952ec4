//! Document store abstraction
//!
//! The resolver talks to storage only through [`DocumentStore`]. Connection
//! handling, retries and query execution belong to the implementation.

use crate::filter::Filter;
use crate::validation::{validate_database_name, CollectionName};
use crate::Result;
use async_trait::async_trait;
use bson::Document as BsonDocument;
use std::fmt;
use std::sync::Arc;

/// Database + collection pair addressed by a store call.
///
/// A namespace without a database targets the store's default database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    database: Option<String>,
    collection: CollectionName,
}

impl Namespace {
    pub fn new(collection: CollectionName) -> Self {
        Self {
            database: None,
            collection,
        }
    }

    /// Shorthand for validating a collection name and building a namespace
    pub fn collection(name: &str) -> Result<Self> {
        Ok(Self::new(CollectionName::new(name)?))
    }

    pub fn with_database(mut self, database: &str) -> Result<Self> {
        validate_database_name(database)?;
        self.database = Some(database.to_string());
        Ok(self)
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn collection_name(&self) -> &CollectionName {
        &self.collection
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database {
            Some(database) => write!(f, "{}.{}", database, self.collection),
            None => write!(f, "{}", self.collection),
        }
    }
}

/// Read access to a document store.
///
/// Implementations must not mutate the store from these calls. Failures to
/// reach the store surface as `MongoRefError::Connection`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return the first document in `namespace` matching `filter`, if any.
    ///
    /// A namespace that does not exist behaves like an empty collection.
    async fn find_one(&self, namespace: &Namespace, filter: &Filter)
        -> Result<Option<BsonDocument>>;

    /// Whether the collection exists in the store
    async fn collection_exists(&self, namespace: &Namespace) -> Result<bool>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    async fn find_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
    ) -> Result<Option<BsonDocument>> {
        (**self).find_one(namespace, filter).await
    }

    async fn collection_exists(&self, namespace: &Namespace) -> Result<bool> {
        (**self).collection_exists(namespace).await
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn find_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
    ) -> Result<Option<BsonDocument>> {
        (**self).find_one(namespace, filter).await
    }

    async fn collection_exists(&self, namespace: &Namespace) -> Result<bool> {
        (**self).collection_exists(namespace).await
    }
}
