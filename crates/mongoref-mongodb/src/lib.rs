//! MongoDB backend for mongoref
//!
//! Provides [`Connection`], a pooled MongoDB client that implements
//! [`mongoref_core::DocumentStore`], so a [`mongoref_core::ReferenceResolver`]
//! can resolve references against a live database.

pub mod connection;
pub mod store;

pub use connection::{Connection, PoolConfig};
pub use mongoref_common::{MongoRefError, Result};
