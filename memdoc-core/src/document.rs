//! Typed documents.
//!
//! Untyped access works on plain [`bson::Document`] values. Types that
//! implement [`Document`] can instead be stored and read back through a
//! [`TypedCollection`](crate::collection::TypedCollection), which serializes
//! them with serde and writes their identity key under the store's identity
//! field.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Core trait for values stored through a typed collection.
///
/// # Example
///
/// ```ignore
/// use memdoc::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Teacher {
///     pub username: String,
///     pub display_name: String,
///     pub role: String,
/// }
///
/// impl Document for Teacher {
///     fn id(&self) -> &str {
///         &self.username
///     }
///
///     fn collection_name() -> &'static str {
///         "teachers"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns this document's identity key.
    fn id(&self) -> &str;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Serialization helpers, implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this value into a BSON document body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the value does not
    /// serialize to a document (e.g. a newtype around a string).
    fn to_document(&self) -> DocumentStoreResult<bson::Document>;

    /// Creates a value from a BSON document.
    fn from_document(document: bson::Document) -> DocumentStoreResult<Self>;

    /// Converts this value to JSON.
    fn to_json(&self) -> DocumentStoreResult<Value>;

    /// Creates a value from JSON.
    fn from_json(value: Value) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_document(&self) -> DocumentStoreResult<bson::Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "expected {} to serialize to a document, got {:?}",
                std::any::type_name::<D>(),
                other.element_type()
            ))),
        }
    }

    fn from_document(document: bson::Document) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> DocumentStoreResult<Self> {
        Ok(from_value(value)?)
    }
}
