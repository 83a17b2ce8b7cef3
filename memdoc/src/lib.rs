//! An in-process stand-in for a document database.
//!
//! `memdoc` lets application data-access code run without a database server.
//! Documents are stored in memory and queried with the same documents a
//! database driver would accept, within a small operator set:
//!
//! - **Queries** - literal equality, `$in`, `$gte`, `$lte`, `$exists`
//! - **Updates** - `$push`, `$pull`
//! - **Aggregation** - `$unwind`, `$group`, `$sort`
//!
//! Returned documents carry their identity key under `_id`, the way a driver
//! returns them, so calling code does not need to know which backend it is
//! using.
//!
//! # Quick Start
//!
//! ```ignore
//! use memdoc::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     // Built once by the application and passed to the code that needs it
//!     let store = DocumentStore::new(
//!         InMemoryStore::builder()
//!             .collection("activities")
//!             .build()
//!             .await?,
//!     );
//!
//!     let activities = store.collection("activities");
//!
//!     activities
//!         .insert_one(doc! {
//!             "_id": "Chess Club",
//!             "schedule_details": { "days": ["Monday", "Friday"] },
//!             "participants": ["michael@mergington.edu"],
//!         })
//!         .await?;
//!
//!     let mondays = activities
//!         .find(doc! { "schedule_details.days": { "$in": ["Monday"] } })
//!         .await?;
//!
//!     let days = activities
//!         .aggregate([
//!             doc! { "$unwind": "$schedule_details.days" },
//!             doc! { "$group": { "_id": "$schedule_details.days" } },
//!             doc! { "$sort": { "_id": 1 } },
//!         ])
//!         .await?;
//!
//!     println!("{mondays:?} {days:?}");
//!
//!     store.shutdown().await
//! }
//! ```
//!
//! # Unsupported operators
//!
//! By default an unknown query operator, update operator or pipeline stage is
//! skipped with a `tracing` warning, so a misspelt operator widens a result
//! instead of failing. Build the store with `strict_operators(true)` to turn
//! those cases into errors.
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage

pub mod prelude;

pub use memdoc_core::{backend, collection, document, error, path, pipeline, query, results, store, update};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use memdoc_memory::{InMemoryStore, InMemoryStoreBuilder, StoreOptions};
}
