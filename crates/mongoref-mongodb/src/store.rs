//! [`DocumentStore`] over a live MongoDB database, plus the write helpers
//! used to seed referenced documents.

use crate::connection::Connection;
use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use mongoref_common::Result;
use mongoref_core::{DocumentStore, Entity, Filter, Namespace};
use tracing::debug;

#[async_trait]
impl DocumentStore for Connection {
    async fn find_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
    ) -> Result<Option<BsonDocument>> {
        let document = self
            .namespace_collection(namespace)
            .find_one(filter.to_document())
            .await?;
        Ok(document)
    }

    async fn collection_exists(&self, namespace: &Namespace) -> Result<bool> {
        let names = self
            .database_for(namespace)
            .list_collection_names()
            .filter(doc! { "name": namespace.collection_name().as_str() })
            .await?;
        Ok(!names.is_empty())
    }
}

impl Connection {
    /// Insert an entity. Its id is the caller's; the server does not assign one.
    pub async fn insert_entity<T: Entity>(&self, namespace: &Namespace, entity: &T) -> Result<()> {
        let document = entity.to_bson()?;
        self.namespace_collection(namespace)
            .insert_one(document)
            .await?;
        debug!(namespace = %namespace, id = %entity.id(), "inserted entity");
        Ok(())
    }

    /// Find an entity in `namespace` by its own id field
    pub async fn find_entity_by_id<T: Entity>(
        &self,
        namespace: &Namespace,
        id: &T::Id,
    ) -> Result<Option<T>> {
        let filter = Filter::eq(T::ID_FIELD, id.clone());
        match self.find_one(namespace, &filter).await? {
            Some(document) => T::from_bson(document).map(Some),
            None => Ok(None),
        }
    }

    /// `$set` the given fields on the first matching document.
    ///
    /// Returns true if a document was modified.
    pub async fn update_fields(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        set: BsonDocument,
    ) -> Result<bool> {
        let result = self
            .namespace_collection(namespace)
            .update_one(filter.to_document(), doc! { "$set": set })
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Drop a collection (test and sample cleanup)
    pub async fn drop_collection(&self, namespace: &Namespace) -> Result<()> {
        self.namespace_collection(namespace).drop().await?;
        Ok(())
    }
}
