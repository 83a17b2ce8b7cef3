//! In-memory document storage backend for memdoc.
//!
//! This crate provides [`InMemoryStore`], an implementation of the
//! `StoreBackend` trait that keeps every collection in process memory. It lets
//! data-access code run without a database server, answering the same query,
//! update and aggregation documents a real driver would accept, within a
//! deliberately small operator set.
//!
//! # Features
//!
//! - **Keyed storage** - Bodies stored by identity key, key merged back in on read
//! - **Filtering** - Equality, `$in`, `$gte`, `$lte` and `$exists`, with dotted paths
//! - **Array updates** - `$push` and `$pull` on documents pinned by identity key
//! - **Aggregation** - `$unwind`, `$group` and `$sort` stages
//! - **Coarse locking** - One async read-write lock around each operation
//!
//! # Quick Start
//!
//! ```ignore
//! use memdoc::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!     let activities = store.collection("activities");
//!
//!     activities
//!         .insert_one(doc! { "_id": "Chess Club", "participants": [] })
//!         .await?;
//!
//!     activities
//!         .update_one(
//!             doc! { "_id": "Chess Club" },
//!             doc! { "$push": { "participants": "michael@mergington.edu" } },
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod aggregate;
mod evaluator;
mod mutator;

pub mod options;
pub mod store;

pub use options::StoreOptions;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
