//! Core types for an in-process stand-in for a document database.
//!
//! This crate is backend-neutral and provides:
//!
//! - **Backend abstraction** ([`backend`]) - The async trait storage engines implement
//! - **Store and collections** ([`store`], [`collection`]) - Handles used by application code
//! - **Query parsing** ([`query`]) - Filter documents turned into an expression tree
//! - **Update parsing** ([`update`]) - `$push` / `$pull` modifications
//! - **Pipeline parsing** ([`pipeline`]) - `$unwind` / `$group` / `$sort` stages
//! - **Dotted paths** ([`path`]) - Nested field access over BSON documents
//! - **Typed documents** ([`document`]) - Serde-backed document types
//! - **Error handling** ([`error`]) - Error and result types

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod path;
pub mod pipeline;
pub mod query;
pub mod results;
pub mod store;
pub mod update;
