//! In-memory storage implementation for document stores.
//!
//! Documents live in insertion-ordered maps keyed by identity, one map per
//! collection, behind a single async read-write lock.

use std::sync::Arc;
use async_trait::async_trait;
use bson::{Bson, Document};
use indexmap::IndexMap;
use mea::rwlock::RwLock;

use memdoc_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    pipeline::Pipeline,
    query::Query,
    results::{InsertOneResult, UpdateResult},
    update::Update,
};

use crate::{
    aggregate::run_pipeline,
    evaluator::DocumentEvaluator,
    mutator::apply_update,
    options::StoreOptions,
};

type CollectionMap = IndexMap<String, Document>;
type StoreMap = IndexMap<String, CollectionMap>;

/// In-memory document storage backend.
///
/// # Storage
///
/// Each collection maps identity keys to document bodies. Bodies never hold
/// the identity field; it is merged back in, as the first field, on every
/// read. Iteration follows first-insertion order, and overwriting a key keeps
/// its position.
///
/// # Concurrency
///
/// `InMemoryStore` is cloneable and clones share the same data. Every
/// operation holds the store-wide lock for its whole duration, so operations
/// never interleave.
///
/// # Performance
///
/// Lookups that pin the identity key are direct map accesses. Every other
/// query scans the collection; there is no indexing.
///
/// # Example
///
/// ```ignore
/// use memdoc_memory::InMemoryStore;
/// use memdoc::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// store.insert_one(doc! { "_id": "Chess Club", "max_participants": 12 }, "activities").await?;
///
/// let found = store.find_one(doc! { "_id": "Chess Club" }, "activities").await?;
/// assert_eq!(found, Some(doc! { "_id": "Chess Club", "max_participants": 12 }));
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> (identity key -> body)
    store: Arc<RwLock<StoreMap>>,
    options: Arc<StoreOptions>,
}

impl InMemoryStore {
    /// Creates a new empty store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Creates a new store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        let store = options
            .collections
            .iter()
            .map(|name| (name.clone(), CollectionMap::new()))
            .collect::<StoreMap>();

        Self {
            store: Arc::new(RwLock::new(store)),
            options: Arc::new(options),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore` with custom options.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the options this store was built with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Copies a stored body and merges its identity key in.
    fn with_identity(&self, key: &str, body: &Document) -> Document {
        let mut document = Document::new();
        document.insert(self.options.identity_field.as_str(), key);

        for (field, value) in body {
            document.insert(field.as_str(), value.clone());
        }

        document
    }

    fn matching<'a>(
        &'a self,
        documents: &'a CollectionMap,
        query: &'a Query,
    ) -> impl Iterator<Item = (&'a String, &'a Document)> + 'a {
        let (keyed, scan) = match query.key() {
            Some(key) => (documents.get_key_value(key), None),
            None => (None, Some(documents.iter())),
        };

        keyed
            .into_iter()
            .chain(scan.into_iter().flatten())
            .filter(move |(key, body)| {
                DocumentEvaluator::new(key, body, &self.options.identity_field)
                    .matches(query.expr())
            })
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    fn identity_field(&self) -> &str {
        &self.options.identity_field
    }

    async fn find_one(
        &self,
        filter: Document,
        collection: &str,
    ) -> DocumentStoreResult<Option<Document>> {
        let query = Query::parse(&filter, &self.options.parse_options())?;
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(None);
        };

        Ok(
            self.matching(documents, &query)
                .next()
                .map(|(key, body)| self.with_identity(key, body))
        )
    }

    async fn find(&self, filter: Document, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let query = Query::parse(&filter, &self.options.parse_options())?;
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(vec![]);
        };

        let found = self
            .matching(documents, &query)
            .map(|(key, body)| self.with_identity(key, body))
            .collect::<Vec<_>>();

        tracing::debug!(collection, matched = found.len(), "find");

        Ok(found)
    }

    async fn insert_one(
        &self,
        mut document: Document,
        collection: &str,
    ) -> DocumentStoreResult<InsertOneResult> {
        let identity_field = self.options.identity_field.as_str();
        let key = match document.remove(identity_field) {
            Some(Bson::String(key)) => key,
            Some(other) => {
                return Err(DocumentStoreError::InvalidDocument(format!(
                    "identity field `{identity_field}` must be a string, found {:?}",
                    other.element_type()
                )));
            },
            None => {
                return Err(DocumentStoreError::InvalidDocument(format!(
                    "document is missing the identity field `{identity_field}`"
                )));
            },
        };

        let mut store = self.store.write().await;
        let replaced = store
            .entry(collection.to_string())
            .or_default()
            .insert(key.clone(), document)
            .is_some();

        tracing::debug!(collection, key = %key, replaced, "inserted document");

        Ok(InsertOneResult { inserted_id: key })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        collection: &str,
    ) -> DocumentStoreResult<UpdateResult> {
        let options = self.options.parse_options();
        let query = Query::parse(&filter, &options)?;
        let update = Update::parse(&update, &options)?;

        let Some(key) = query.key() else {
            tracing::debug!(collection, "update_one without an identity key matches nothing");
            return Ok(UpdateResult::unmatched());
        };

        let mut store = self.store.write().await;
        let Some(body) = store
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(key))
        else {
            return Ok(UpdateResult::unmatched());
        };

        if !DocumentEvaluator::new(key, body, &self.options.identity_field).matches(query.expr()) {
            return Ok(UpdateResult::unmatched());
        }

        apply_update(body, &update)?;

        tracing::debug!(collection, key, ops = update.ops().len(), "updated document");

        Ok(UpdateResult::modified())
    }

    async fn count_documents(
        &self,
        filter: Document,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        let query = Query::parse(&filter, &self.options.parse_options())?;
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(0);
        };

        if query.is_empty() {
            return Ok(documents.len() as u64);
        }

        Ok(self.matching(documents, &query).count() as u64)
    }

    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Document>> {
        let pipeline = Pipeline::parse(&pipeline, &self.options.parse_options())?;
        let store = self.store.read().await;
        let documents = store
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(key, body)| self.with_identity(key, body))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let results = run_pipeline(&pipeline, documents)?;

        tracing::debug!(
            collection,
            stages = pipeline.stages().len(),
            results = results.len(),
            "aggregate"
        );

        Ok(results)
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use memdoc_memory::InMemoryStore;
/// use memdoc::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .collection("activities")
///     .collection("teachers")
///     .strict_operators(true)
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    options: StoreOptions,
}

impl InMemoryStoreBuilder {
    /// Starts from previously loaded options.
    pub fn from_options(options: StoreOptions) -> Self {
        Self { options }
    }

    /// Sets the field identity keys are read from and exposed under. Defaults to `_id`.
    pub fn identity_field(mut self, field: impl Into<String>) -> Self {
        self.options.identity_field = field.into();
        self
    }

    /// Rejects unknown operators and stages instead of ignoring them.
    pub fn strict_operators(mut self, strict: bool) -> Self {
        self.options.strict_operators = strict;
        self
    }

    /// Creates the named collection when the store is built.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.options.collections.push(name.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds a fresh store.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Initialization`] if the identity field is
    /// empty or contains a `.`, which would make it unreachable by queries.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let identity_field = &self.options.identity_field;

        if identity_field.is_empty()
            || identity_field.contains('.')
            || identity_field.starts_with('$')
        {
            return Err(DocumentStoreError::Initialization(format!(
                "invalid identity field `{identity_field}`"
            )));
        }

        Ok(InMemoryStore::with_options(self.options))
    }
}
