//! Common utilities for mongoref
//!
//! This crate provides the error type shared by every mongoref crate.

pub mod error;

pub use error::{MongoRefError, Result};
