//! Reference walkthrough: store a module and a project pointing at it,
//! read the project back, follow its module reference, rename the project
//! and read it again.

use crate::models::{EmbeddedProject, Module, Project, MODULES, PROJECTS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use chrono::Utc;
use mongoref_core::{
    DocumentReference, DocumentStore, Entity, Filter, MemoryStore, MongoRefError, Namespace,
    ReferenceResolver,
};
use mongoref_mongodb::Connection;
use tracing::info;

/// Writes the walkthrough needs on top of [`DocumentStore`] reads
#[async_trait]
pub trait SampleStore: DocumentStore {
    async fn insert<T: Entity>(
        &self,
        namespace: &Namespace,
        entity: &T,
    ) -> mongoref_core::Result<()>;

    async fn update(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        set: BsonDocument,
    ) -> mongoref_core::Result<bool>;
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn insert<T: Entity>(
        &self,
        namespace: &Namespace,
        entity: &T,
    ) -> mongoref_core::Result<()> {
        self.insert_entity(namespace, entity)
    }

    async fn update(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        set: BsonDocument,
    ) -> mongoref_core::Result<bool> {
        self.update_one(namespace, filter, set)
    }
}

#[async_trait]
impl SampleStore for Connection {
    async fn insert<T: Entity>(
        &self,
        namespace: &Namespace,
        entity: &T,
    ) -> mongoref_core::Result<()> {
        self.insert_entity(namespace, entity).await
    }

    async fn update(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        set: BsonDocument,
    ) -> mongoref_core::Result<bool> {
        self.update_fields(namespace, filter, set).await
    }
}

/// What the walkthrough ended with
#[derive(Debug)]
pub struct SampleOutcome {
    pub module: Module,
    pub project: Project,
    pub renamed: bool,
}

pub async fn run<S: SampleStore>(store: &S) -> Result<SampleOutcome> {
    let modules = Namespace::collection(MODULES)?;
    let projects = Namespace::collection(PROJECTS)?;
    let resolver = ReferenceResolver::new(store);

    // Insert documents separately
    let module = Module::new("Module1");
    store
        .insert(&modules, &module)
        .await
        .context("Failed to insert module")?;

    let mut project = Project::new("Proj1").starting_at(Utc::now());
    project.add_module(DocumentReference::to(MODULES, &module)?);
    store
        .insert(&projects, &project)
        .await
        .context("Failed to insert project")?;
    info!(project = %project.id, module = %module.id, "inserted project and module");

    let project_ref = DocumentReference::to(PROJECTS, &project)?;
    let stored: Project = resolver.resolve(&project_ref).await?;

    let first = stored
        .modules()
        .first()
        .ok_or_else(|| MongoRefError::not_found(MODULES, "<no module references>"))?;
    let fetched: Module = resolver
        .resolve(first)
        .await
        .with_context(|| format!("Failed to resolve {}", first))?;
    info!(module = %fetched.id, name = %fetched.name, "resolved module reference");

    let filter = Filter::eq(Project::ID_FIELD, project.id);
    let renamed = store
        .update(&projects, &filter, doc! { "name": "Proj1(Updated)" })
        .await
        .context("Failed to rename project")?;

    let project: Project = resolver.resolve(&project_ref).await?;
    info!(name = %project.name, renamed, "reloaded project");

    Ok(SampleOutcome {
        module: fetched,
        project,
        renamed,
    })
}

/// Embedding variant: the module lives inside the project document, so one
/// lookup brings back both.
pub async fn run_embedded<S: SampleStore>(store: &S) -> Result<EmbeddedProject> {
    let projects = Namespace::collection(PROJECTS)?;

    let project = EmbeddedProject::new("Proj1").with_module("Module1");
    store
        .insert(&projects, &project)
        .await
        .context("Failed to insert project")?;

    let stored: EmbeddedProject = ReferenceResolver::new(store)
        .resolve(&DocumentReference::to(PROJECTS, &project)?)
        .await?;
    info!(project = %stored.id, modules = stored.modules.len(), "reloaded embedded project");

    Ok(stored)
}
