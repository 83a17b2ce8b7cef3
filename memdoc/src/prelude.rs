//! Convenient re-exports of commonly used types from memdoc.
//!
//! ```ignore
//! use memdoc::prelude::*;
//! ```

pub use memdoc_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{Collection, TypedCollection},
    document::{Document, DocumentExt},
    error::{DocumentStoreError, DocumentStoreResult},
    results::{InsertOneResult, UpdateResult},
    store::DocumentStore,
};
