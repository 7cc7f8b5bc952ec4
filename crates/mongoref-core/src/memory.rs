//! In-memory document store
//!
//! Keeps documents per database and collection in insertion order, so a
//! lookup that matches several documents returns the earliest inserted one.
//! Ids are not checked for uniqueness.

use crate::entity::Entity;
use crate::filter::Filter;
use crate::store::{DocumentStore, Namespace};
use crate::Result;
use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use mongoref_common::MongoRefError;
use parking_lot::RwLock;
use std::collections::HashMap;

type Collections = HashMap<String, Vec<BsonDocument>>;

/// Thread-safe in-memory [`DocumentStore`]
#[derive(Debug)]
pub struct MemoryStore {
    default_database: String,
    databases: RwLock<HashMap<String, Collections>>,
}

impl MemoryStore {
    pub fn new(default_database: impl Into<String>) -> Self {
        Self {
            default_database: default_database.into(),
            databases: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_database(&self) -> &str {
        &self.default_database
    }

    fn database_of<'a>(&'a self, namespace: &'a Namespace) -> &'a str {
        namespace.database().unwrap_or(&self.default_database)
    }

    /// Create an empty collection. Existing collections are left untouched.
    pub fn create_collection(&self, namespace: &Namespace) {
        let database = self.database_of(namespace).to_string();
        self.databases
            .write()
            .entry(database)
            .or_default()
            .entry(namespace.collection_name().to_string())
            .or_default();
    }

    /// Append a raw document, creating the collection on first insert
    pub fn insert(&self, namespace: &Namespace, document: BsonDocument) {
        let database = self.database_of(namespace).to_string();
        self.databases
            .write()
            .entry(database)
            .or_default()
            .entry(namespace.collection_name().to_string())
            .or_default()
            .push(document);
    }

    /// Serialize and append an entity
    pub fn insert_entity<T: Entity>(&self, namespace: &Namespace, entity: &T) -> Result<()> {
        let document = entity.to_bson()?;
        self.insert(namespace, document);
        Ok(())
    }

    /// Apply `$set`-style field updates to the first matching document.
    ///
    /// Dotted keys address embedded fields and create missing parents. The
    /// update is all or nothing: a path through a non-document value fails
    /// with `Validation` and leaves the document untouched.
    ///
    /// Returns true if a document was modified.
    pub fn update_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        set: BsonDocument,
    ) -> Result<bool> {
        let database = self.database_of(namespace);
        let mut databases = self.databases.write();
        let target = databases
            .get_mut(database)
            .and_then(|collections| collections.get_mut(namespace.collection_name().as_str()))
            .and_then(|documents| documents.iter_mut().find(|doc| filter.matches(doc)));

        let Some(document) = target else {
            return Ok(false);
        };

        let mut updated = document.clone();
        let mut modified = false;
        for (path, value) in set {
            modified |= set_path(&mut updated, &path, value)?;
        }
        if modified {
            *document = updated;
        }
        Ok(modified)
    }

    /// Remove a collection and its documents. Returns true if it existed.
    pub fn drop_collection(&self, namespace: &Namespace) -> bool {
        let database = self.database_of(namespace);
        self.databases
            .write()
            .get_mut(database)
            .and_then(|collections| collections.remove(namespace.collection_name().as_str()))
            .is_some()
    }

    /// Number of documents in a collection (0 if it does not exist)
    pub fn len(&self, namespace: &Namespace) -> usize {
        let database = self.database_of(namespace);
        self.databases
            .read()
            .get(database)
            .and_then(|collections| collections.get(namespace.collection_name().as_str()))
            .map_or(0, Vec::len)
    }

    /// Collection names in a database, sorted
    pub fn collection_names(&self, database: Option<&str>) -> Vec<String> {
        let database = database.unwrap_or(&self.default_database);
        let mut names: Vec<String> = self
            .databases
            .read()
            .get(database)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Set one dotted path, returning whether the stored value changed
fn set_path(document: &mut BsonDocument, path: &str, value: Bson) -> Result<bool> {
    match path.split_once('.') {
        None => {
            if document.get(path) == Some(&value) {
                return Ok(false);
            }
            document.insert(path, value);
            Ok(true)
        }
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Bson::Document(BsonDocument::new()));
            match child {
                Bson::Document(inner) => set_path(inner, rest, value),
                other => Err(MongoRefError::Validation(format!(
                    "Cannot create field '{}' in element {{{}: {}}}",
                    rest, head, other
                ))),
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("test")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
    ) -> Result<Option<BsonDocument>> {
        let database = self.database_of(namespace);
        let found = self
            .databases
            .read()
            .get(database)
            .and_then(|collections| collections.get(namespace.collection_name().as_str()))
            .and_then(|documents| documents.iter().find(|doc| filter.matches(doc)).cloned());
        Ok(found)
    }

    async fn collection_exists(&self, namespace: &Namespace) -> Result<bool> {
        let database = self.database_of(namespace);
        Ok(self
            .databases
            .read()
            .get(database)
            .is_some_and(|collections| {
                collections.contains_key(namespace.collection_name().as_str())
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn modules() -> Namespace {
        Namespace::collection("modules").unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new("i18nMgr");
        store.insert(&modules(), doc! { "_id": "m1", "name": "Module1" });

        let found = store
            .find_one(&modules(), &Filter::eq("_id", "m1"))
            .await
            .unwrap();
        assert_eq!(found, Some(doc! { "_id": "m1", "name": "Module1" }));

        let missing = store
            .find_one(&modules(), &Filter::eq("_id", "m2"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_first_inserted_wins() {
        let store = MemoryStore::default();
        store.insert(&modules(), doc! { "_id": "dup", "name": "first" });
        store.insert(&modules(), doc! { "_id": "dup", "name": "second" });

        let found = store
            .find_one(&modules(), &Filter::eq("_id", "dup"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "first");
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let store = MemoryStore::new("main");
        let other = modules().with_database("other").unwrap();
        store.insert(&other, doc! { "_id": "m1" });

        assert!(store
            .find_one(&modules(), &Filter::eq("_id", "m1"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_one(&other, &Filter::eq("_id", "m1"))
            .await
            .unwrap()
            .is_some());

        // Naming the default database explicitly reaches the same collections
        let explicit = modules().with_database("main").unwrap();
        store.insert(&modules(), doc! { "_id": "m2" });
        assert_eq!(store.len(&explicit), 1);
    }

    #[tokio::test]
    async fn test_collection_exists() {
        let store = MemoryStore::default();
        assert!(!store.collection_exists(&modules()).await.unwrap());

        store.create_collection(&modules());
        assert!(store.collection_exists(&modules()).await.unwrap());
        assert_eq!(store.len(&modules()), 0);

        assert!(store.drop_collection(&modules()));
        assert!(!store.collection_exists(&modules()).await.unwrap());
        assert!(!store.drop_collection(&modules()));
    }

    #[test]
    fn test_update_one() {
        let store = MemoryStore::default();
        let projects = Namespace::collection("projects").unwrap();
        store.insert(&projects, doc! { "_id": "p1", "name": "Proj1" });

        let filter = Filter::eq("_id", "p1");
        let renamed = doc! { "name": "Proj1(Updated)" };
        assert!(store.update_one(&projects, &filter, renamed.clone()).unwrap());
        // Same value again is not a modification
        assert!(!store.update_one(&projects, &filter, renamed).unwrap());
        assert!(!store
            .update_one(&projects, &Filter::eq("_id", "p9"), doc! { "name": "x" })
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_one_dotted_path() {
        let store = MemoryStore::default();
        let projects = Namespace::collection("projects").unwrap();
        store.insert(
            &projects,
            doc! { "_id": "p1", "owner": { "name": "alice", "team": "core" } },
        );
        let filter = Filter::eq("_id", "p1");

        assert!(store
            .update_one(&projects, &filter, doc! { "owner.name": "bob", "meta.rev": 2 })
            .unwrap());

        let stored = store.find_one(&projects, &filter).await.unwrap().unwrap();
        assert_eq!(
            stored,
            doc! {
                "_id": "p1",
                "owner": { "name": "bob", "team": "core" },
                "meta": { "rev": 2 }
            }
        );
        assert!(!stored.contains_key("owner.name"));
        assert!(Filter::eq("owner.name", "bob").matches(&stored));
    }

    #[tokio::test]
    async fn test_update_one_through_scalar_is_rejected() {
        let store = MemoryStore::default();
        let projects = Namespace::collection("projects").unwrap();
        store.insert(&projects, doc! { "_id": "p1", "name": "Proj1", "owner": "alice" });
        let filter = Filter::eq("_id", "p1");

        let err = store
            .update_one(&projects, &filter, doc! { "name": "Renamed", "owner.name": "bob" })
            .unwrap_err();
        assert!(matches!(err, MongoRefError::Validation(_)));

        // Nothing from the failed update was applied
        let stored = store.find_one(&projects, &filter).await.unwrap().unwrap();
        assert_eq!(stored, doc! { "_id": "p1", "name": "Proj1", "owner": "alice" });
    }

    #[test]
    fn test_collection_names_sorted() {
        let store = MemoryStore::default();
        store.create_collection(&Namespace::collection("projects").unwrap());
        store.create_collection(&modules());
        assert_eq!(store.collection_names(None), vec!["modules", "projects"]);
        assert!(store.collection_names(Some("empty")).is_empty());
    }
}
