//! Integration tests for reference resolution against a live MongoDB.
//!
//! These tests require a MongoDB server to be running.
//! Set MONGODB_URI (including a database name) or they use
//! mongodb://localhost:27017/mongoref_test. Run with --ignored.

use bson::Uuid;
use mongoref_core::{
    DocumentReference, Entity, Filter, MissingCollectionPolicy, MongoRefError, Namespace,
    ReferenceResolver,
};
use mongoref_mongodb::{Connection, PoolConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Module {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
}

impl Entity for Module {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

async fn connect() -> Connection {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/mongoref_test".to_string());
    Connection::new(&uri).await.unwrap()
}

/// Collection name unique to one test run
fn scratch(prefix: &str) -> Namespace {
    Namespace::collection(&format!("{}_{}", prefix, Uuid::new())).unwrap()
}

#[tokio::test]
#[ignore] // Only run with --ignored flag when database is available
async fn test_resolve_inserted_module() {
    let conn = connect().await;
    let modules = scratch("modules");

    let module = Module {
        id: Uuid::new(),
        name: "Module1".to_string(),
    };
    conn.insert_entity(&modules, &module).await.unwrap();

    let reference =
        DocumentReference::to(modules.collection_name().as_str(), &module).unwrap();
    let resolver = ReferenceResolver::new(&conn);
    let resolved: Module = resolver.resolve(&reference).await.unwrap();
    assert_eq!(resolved, module);

    let missing =
        DocumentReference::new(modules.collection_name().as_str(), Uuid::new()).unwrap();
    let err = resolver.resolve::<Module>(&missing).await.unwrap_err();
    assert!(err.is_not_found());

    conn.drop_collection(&modules).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_missing_collection_policies() {
    let conn = connect().await;
    let absent = scratch("absent");
    let reference =
        DocumentReference::new(absent.collection_name().as_str(), Uuid::new()).unwrap();

    let lenient = ReferenceResolver::new(&conn);
    assert!(lenient
        .resolve::<Module>(&reference)
        .await
        .unwrap_err()
        .is_not_found());

    let strict = ReferenceResolver::new(&conn).with_policy(MissingCollectionPolicy::Strict);
    let err = strict.resolve::<Module>(&reference).await.unwrap_err();
    assert!(matches!(err, MongoRefError::CollectionNotFound(_)));
}

#[tokio::test]
#[ignore]
async fn test_update_then_find_again() {
    let conn = connect().await;
    let modules = scratch("modules");

    let module = Module {
        id: Uuid::new(),
        name: "Module1".to_string(),
    };
    conn.insert_entity(&modules, &module).await.unwrap();

    let filter = Filter::eq(Module::ID_FIELD, module.id);
    let modified = conn
        .update_fields(&modules, &filter, bson::doc! { "name": "Module1(Updated)" })
        .await
        .unwrap();
    assert!(modified);

    let found: Module = conn
        .find_entity_by_id(&modules, &module.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Module1(Updated)");

    conn.drop_collection(&modules).await.unwrap();
}

#[tokio::test]
#[ignore] // Needs nothing listening on the port
async fn test_unreachable_server_is_connection_error() {
    let config = PoolConfig {
        server_selection_timeout: Some(Duration::from_millis(200)),
        connect_timeout: Some(Duration::from_millis(200)),
        ..PoolConfig::default()
    };
    let conn = Connection::with_config("mongodb://127.0.0.1:1/mongoref_test", config)
        .await
        .unwrap();

    let reference = DocumentReference::new("modules", Uuid::new()).unwrap();
    let err = ReferenceResolver::new(&conn)
        .resolve::<Module>(&reference)
        .await
        .unwrap_err();
    assert!(err.is_retryable(), "unexpected error: {err}");
}
