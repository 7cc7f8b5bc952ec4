//! Example entities: projects referencing their modules

use bson::{Bson, Document as BsonDocument, Uuid};
use chrono::{DateTime, Utc};
use mongoref_core::{DocumentReference, Entity};
use serde::{Deserialize, Serialize};

pub const MODULES: &str = "modules";
pub const PROJECTS: &str = "projects";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new(),
            name: name.into(),
        }
    }
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

/// A project holding references to modules stored in their own collection.
///
/// `moduleCount` is stored alongside the references and kept in step by the
/// mutators. It is written as a BSON int64; a count that does not fit fails
/// serialization instead of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<bson::DateTime>,
    #[serde(default)]
    modules: Vec<DocumentReference>,
    #[serde(default)]
    module_count: usize,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new(),
            name: name.into(),
            start_time: None,
            modules: Vec::new(),
            module_count: 0,
        }
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(bson::DateTime::from_chrono(start));
        self
    }

    pub fn add_module(&mut self, reference: DocumentReference) {
        self.modules.push(reference);
        self.module_count = self.modules.len();
    }

    pub fn modules(&self) -> &[DocumentReference] {
        &self.modules
    }

    pub fn module_count(&self) -> usize {
        self.module_count
    }
}

impl Entity for Project {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// A module stored inline in its project instead of in its own collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedModule {
    pub name: String,
}

/// A project carrying whole module documents rather than references to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedProject {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub modules: Vec<EmbeddedModule>,
}

impl EmbeddedProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new(),
            name: name.into(),
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.modules.push(EmbeddedModule { name: name.into() });
        self
    }
}

impl Entity for EmbeddedProject {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

static NULL_ID: Bson = Bson::Null;

/// Any stored document, identified by whatever its `_id` holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDocument(pub BsonDocument);

impl Entity for RawDocument {
    type Id = Bson;

    fn id(&self) -> &Bson {
        self.0.get(Self::ID_FIELD).unwrap_or(&NULL_ID)
    }

    fn set_id(&mut self, id: Bson) {
        self.0.insert(Self::ID_FIELD, id);
    }
}
