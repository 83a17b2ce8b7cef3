//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the seam between application code and the
//! storage engine. Operations take query, update and pipeline documents in the
//! same shape a database driver would, and return documents with the identity
//! key merged in under [`StoreBackend::identity_field`]. Calling code therefore
//! does not need to know which backend it is talking to.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances

use async_trait::async_trait;
use bson::Document;
use std::fmt::Debug;

use crate::{
    error::DocumentStoreResult,
    results::{InsertOneResult, UpdateResult},
};

/// Abstract interface for document storage backends.
///
/// # Error Handling
///
/// Misses are not errors: `find_one` returns `Ok(None)`, `update_one` a zero
/// modified count. Errors signal malformed input or a broken contract, such as
/// inserting a document without an identity field.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// The field under which identity keys are exposed, usually `_id`.
    fn identity_field(&self) -> &str;

    /// Returns the first document matching `filter`, or `None`.
    ///
    /// An empty filter returns the first document in store order. A filter
    /// with a string equality on the identity field is resolved by direct
    /// lookup.
    async fn find_one(
        &self,
        filter: Document,
        collection: &str,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Returns every document matching `filter`, in store order.
    async fn find(&self, filter: Document, collection: &str) -> DocumentStoreResult<Vec<Document>>;

    /// Stores `document` under the value of its identity field.
    ///
    /// The identity field is removed from the stored body. An existing
    /// document with the same key is overwritten. The collection is created if
    /// it does not exist.
    async fn insert_one(
        &self,
        document: Document,
        collection: &str,
    ) -> DocumentStoreResult<InsertOneResult>;

    /// Applies `update` to the single document pinned by `filter`.
    ///
    /// Only filters naming the identity key are supported; any other filter
    /// reports zero documents modified.
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        collection: &str,
    ) -> DocumentStoreResult<UpdateResult>;

    /// Counts the documents matching `filter`.
    async fn count_documents(&self, filter: Document, collection: &str) -> DocumentStoreResult<u64>;

    /// Runs an aggregation pipeline over the whole collection.
    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Document>>;

    /// Creates an empty collection. Creating an existing collection is a no-op.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Releases any resources held by the backend.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    fn identity_field(&self) -> &str {
        (*self).identity_field()
    }

    async fn find_one(
        &self,
        filter: Document,
        collection: &str,
    ) -> DocumentStoreResult<Option<Document>> {
        (*self)
            .find_one(filter, collection)
            .await
    }

    async fn find(&self, filter: Document, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        (*self)
            .find(filter, collection)
            .await
    }

    async fn insert_one(
        &self,
        document: Document,
        collection: &str,
    ) -> DocumentStoreResult<InsertOneResult> {
        (*self)
            .insert_one(document, collection)
            .await
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        collection: &str,
    ) -> DocumentStoreResult<UpdateResult> {
        (*self)
            .update_one(filter, update, collection)
            .await
    }

    async fn count_documents(&self, filter: Document, collection: &str) -> DocumentStoreResult<u64> {
        (*self)
            .count_documents(filter, collection)
            .await
    }

    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Document>> {
        (*self)
            .aggregate(pipeline, collection)
            .await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (*self).create_collection(name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        (*self).list_collections().await
    }
}

/// Factory trait for constructing a backend.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
