//! Collection handles.
//!
//! A collection handle binds a collection name to a backend reference and
//! exposes the document operations on it:
//!
//! - [`Collection`] - Untyped collection working on [`bson::Document`] values
//! - [`TypedCollection`] - Collection of a specific [`Document`] type
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! # async fn example(store: &memdoc::store::DocumentStore<impl memdoc::backend::StoreBackend>) -> memdoc::error::DocumentStoreResult<()> {
//! let activities = store.collection("activities");
//!
//! activities
//!     .insert_one(doc! { "_id": "Chess Club", "participants": ["michael@mergington.edu"] })
//!     .await?;
//!
//! activities
//!     .update_one(
//!         doc! { "_id": "Chess Club" },
//!         doc! { "$push": { "participants": "daniel@mergington.edu" } },
//!     )
//!     .await?;
//! # Ok(()) }
//! ```

use bson::Document as BsonDocument;
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    results::{InsertOneResult, UpdateResult},
};

/// An untyped collection with a reference to a storage backend.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the first document matching `filter`, with its identity key attached.
    ///
    /// Pass an empty document to take the first document in store order.
    pub async fn find_one(&self, filter: BsonDocument) -> DocumentStoreResult<Option<BsonDocument>> {
        self.backend
            .find_one(filter, self.name())
            .await
    }

    /// Returns every document matching `filter`, in store order.
    ///
    /// An empty result is `Ok(vec![])`, never an error.
    pub async fn find(&self, filter: BsonDocument) -> DocumentStoreResult<Vec<BsonDocument>> {
        self.backend
            .find(filter, self.name())
            .await
    }

    /// Inserts a document, which must carry the identity field.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`](crate::error::DocumentStoreError::InvalidDocument)
    /// if the identity field is missing or is not a string.
    pub async fn insert_one(&self, document: BsonDocument) -> DocumentStoreResult<InsertOneResult> {
        self.backend
            .insert_one(document, self.name())
            .await
    }

    /// Applies `$push`/`$pull` modifications to the document pinned by `filter`.
    pub async fn update_one(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
    ) -> DocumentStoreResult<UpdateResult> {
        self.backend
            .update_one(filter, update, self.name())
            .await
    }

    /// Counts the documents matching `filter`.
    pub async fn count_documents(&self, filter: BsonDocument) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }

    /// Runs an `$unwind`/`$group`/`$sort` pipeline over the collection.
    pub async fn aggregate(
        &self,
        pipeline: impl IntoIterator<Item = BsonDocument>,
    ) -> DocumentStoreResult<Vec<BsonDocument>> {
        self.backend
            .aggregate(pipeline.into_iter().collect(), self.name())
            .await
    }
}

/// A collection of a specific document type.
///
/// Values are serialized with serde. On insert the value's [`Document::id`] is
/// written under the backend's identity field; on read the identity field is
/// present in the decoded document, so types can either map it with
/// `#[serde(rename = "_id")]` or ignore it.
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Converts this typed collection to a different document type.
    pub fn with_type<T: Document>(&self) -> TypedCollection<'a, B, T> {
        TypedCollection {
            name: self.name.clone(),
            backend: self.backend,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped view of this collection.
    pub fn untyped(&self) -> Collection<'a, B> {
        Collection::new(self.name.clone(), self.backend)
    }

    /// Inserts a document, overwriting any existing document with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn insert_one(&self, document: &D) -> DocumentStoreResult<InsertOneResult> {
        let mut body = document.to_document()?;
        body.insert(self.backend.identity_field(), document.id());

        self.backend
            .insert_one(body, self.name())
            .await
    }

    /// Returns the first document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored document cannot be decoded as `D`.
    pub async fn find_one(&self, filter: BsonDocument) -> DocumentStoreResult<Option<D>> {
        self.backend
            .find_one(filter, self.name())
            .await?
            .map(D::from_document)
            .transpose()
    }

    /// Returns every document matching `filter`.
    pub async fn find(&self, filter: BsonDocument) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .find(filter, self.name())
            .await?
            .into_iter()
            .map(D::from_document)
            .collect()
    }

    /// Applies `$push`/`$pull` modifications to the document pinned by `filter`.
    pub async fn update_one(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
    ) -> DocumentStoreResult<UpdateResult> {
        self.backend
            .update_one(filter, update, self.name())
            .await
    }

    /// Counts the documents matching `filter`.
    pub async fn count_documents(&self, filter: BsonDocument) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }
}
