//! Update document parsing.
//!
//! Only the array operators are understood:
//!
//! ```ignore
//! use bson::doc;
//!
//! let update = doc! {
//!     "$push": { "participants": "emma@mergington.edu" },
//!     "$pull": { "participants": "sophia@mergington.edu" },
//! };
//! ```
//!
//! Each operator maps field paths to a single value. Pushes are applied before
//! pulls.

use bson::{Bson, Document};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::ParseOptions,
};

/// A single array modification.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Append `value` to the array at `field`, creating it when absent.
    Push { field: String, value: Bson },
    /// Remove every element equal to `value` from the array at `field`.
    Pull { field: String, value: Bson },
}

/// A parsed update, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    /// Parses an update document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidUpdate`] if `$push` or `$pull` is
    /// not given a document or targets the identity field, or if an unknown
    /// operator is used while `strict_operators` is set.
    pub fn parse(document: &Document, options: &ParseOptions<'_>) -> DocumentStoreResult<Self> {
        let mut pushes = Vec::new();
        let mut pulls = Vec::new();

        for (op, spec) in document {
            match op.as_str() {
                "$push" => pushes.extend(
                    fields(op, spec, options.identity_field)?
                        .into_iter()
                        .map(|(field, value)| UpdateOp::Push { field, value }),
                ),
                "$pull" => pulls.extend(
                    fields(op, spec, options.identity_field)?
                        .into_iter()
                        .map(|(field, value)| UpdateOp::Pull { field, value }),
                ),
                other => options.unsupported(DocumentStoreError::InvalidUpdate(format!(
                    "unsupported update operator `{other}`"
                )))?,
            }
        }

        pushes.extend(pulls);

        Ok(Self { ops: pushes })
    }

    /// The modifications in the order they are applied.
    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn fields(op: &str, spec: &Bson, identity_field: &str) -> DocumentStoreResult<Vec<(String, Bson)>> {
    let Bson::Document(fields) = spec else {
        return Err(DocumentStoreError::InvalidUpdate(format!(
            "`{op}` requires a document of field/value pairs"
        )));
    };

    fields
        .iter()
        .map(|(field, value)| {
            if field.split('.').next() == Some(identity_field) {
                return Err(DocumentStoreError::InvalidUpdate(format!(
                    "`{op}` cannot modify the identity field `{identity_field}`"
                )));
            }

            Ok((field.clone(), value.clone()))
        })
        .collect()
}
