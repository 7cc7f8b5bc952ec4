//! Typed reference resolution for document stores
//!
//! A document in one collection can point at a document in another through a
//! [`DocumentReference`] (collection name + id, stored with the DBRef field
//! convention `$ref` / `$id` / `$db`). [`ReferenceResolver`] turns such a
//! reference back into a typed [`Entity`] using any [`DocumentStore`].
//!
//! # Features
//! - Entity capability trait instead of a base class
//! - Equality filters usable against MongoDB and in memory
//! - In-memory store for tests and offline runs
//! - Configurable policy for references into missing collections

pub mod entity;
pub mod filter;
pub mod memory;
pub mod reference;
pub mod resolver;
pub mod store;
pub mod validation;

pub use entity::{Entity, EntityId};
pub use filter::Filter;
pub use memory::MemoryStore;
pub use mongoref_common::{MongoRefError, Result};
pub use reference::DocumentReference;
pub use resolver::{resolve, MissingCollectionPolicy, ReferenceResolver};
pub use store::{DocumentStore, Namespace};
pub use validation::{validate_database_name, CollectionName};
