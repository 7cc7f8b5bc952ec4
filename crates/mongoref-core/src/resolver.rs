//! Reference resolution
//!
//! Turns a [`DocumentReference`] into the typed document it points at. Each
//! call is a single find-one against the store: nothing is cached and the
//! store is never written to.

use crate::entity::Entity;
use crate::filter::Filter;
use crate::reference::DocumentReference;
use crate::store::DocumentStore;
use crate::Result;
use mongoref_common::MongoRefError;
use tracing::debug;

/// What to do when a reference names a collection that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCollectionPolicy {
    /// Treat the collection as empty: the reference resolves to not-found.
    #[default]
    Empty,
    /// Fail with `CollectionNotFound`. Costs one existence check after a miss.
    Strict,
}

/// Resolves references against a shared store handle.
///
/// Holds no state besides the store, so one resolver can serve concurrent
/// tasks (`ReferenceResolver<Arc<S>>` is `Clone`).
#[derive(Debug, Clone)]
pub struct ReferenceResolver<S> {
    store: S,
    policy: MissingCollectionPolicy,
}

impl<S: DocumentStore> ReferenceResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: MissingCollectionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MissingCollectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> MissingCollectionPolicy {
        self.policy
    }

    /// Look up the referenced document, returning `None` if nothing matches.
    ///
    /// If several documents share the id, the first one the store returns wins.
    pub async fn find<T: Entity>(&self, reference: &DocumentReference<T::Id>) -> Result<Option<T>> {
        let namespace = reference.namespace()?;
        let filter = Filter::eq(T::ID_FIELD, reference.id().clone());

        debug!(namespace = %namespace, id = %reference.id(), "resolving reference");

        match self.store.find_one(&namespace, &filter).await? {
            Some(document) => T::from_bson(document).map(Some),
            None => {
                if self.policy == MissingCollectionPolicy::Strict
                    && !self.store.collection_exists(&namespace).await?
                {
                    return Err(MongoRefError::CollectionNotFound(namespace.to_string()));
                }
                debug!(namespace = %namespace, id = %reference.id(), "reference not found");
                Ok(None)
            }
        }
    }

    /// Resolve the referenced document, failing with `NotFound` if nothing matches
    pub async fn resolve<T: Entity>(&self, reference: &DocumentReference<T::Id>) -> Result<T> {
        self.find(reference)
            .await?
            .ok_or_else(|| MongoRefError::not_found(reference.collection(), reference.id()))
    }

    /// Resolve several references in order, one lookup each.
    ///
    /// Missing targets come back as `None` at their position; any other
    /// error stops the batch.
    pub async fn resolve_all<T: Entity>(
        &self,
        references: &[DocumentReference<T::Id>],
    ) -> Result<Vec<Option<T>>> {
        let mut resolved = Vec::with_capacity(references.len());
        for reference in references {
            resolved.push(self.find(reference).await?);
        }
        Ok(resolved)
    }
}

/// Resolve a single reference with the default missing-collection policy
pub async fn resolve<T, S>(store: &S, reference: &DocumentReference<T::Id>) -> Result<T>
where
    T: Entity,
    S: DocumentStore + ?Sized,
{
    ReferenceResolver::new(store).resolve(reference).await
}
