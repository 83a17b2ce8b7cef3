//! Applies parsed `$push` / `$pull` updates to stored document bodies.

use bson::{Bson, Document};

use memdoc_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    path::{get_path, get_path_mut, set_path},
    update::{Update, UpdateOp},
};

use crate::evaluator::values_equal;

/// Applies every operation in `update` to `body`.
///
/// The body is only replaced once all operations succeeded, so a failing
/// operation leaves it untouched.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidUpdate`] when a target field exists
/// but is not an array.
pub(crate) fn apply_update(body: &mut Document, update: &Update) -> DocumentStoreResult<()> {
    let mut updated = body.clone();

    for op in update.ops() {
        match op {
            UpdateOp::Push { field, value } => push(&mut updated, field, value)?,
            UpdateOp::Pull { field, value } => pull(&mut updated, field, value)?,
        }
    }

    *body = updated;
    Ok(())
}

fn push(body: &mut Document, field: &str, value: &Bson) -> DocumentStoreResult<()> {
    if get_path(body, field).is_none() {
        return set_path(body, field, Bson::Array(vec![value.clone()]))
            .map_err(|err| DocumentStoreError::InvalidUpdate(err.to_string()));
    }

    match get_path_mut(body, field) {
        Some(Bson::Array(items)) => {
            items.push(value.clone());
            Ok(())
        },
        Some(other) => Err(not_an_array("$push", field, other)),
        None => Ok(()),
    }
}

fn pull(body: &mut Document, field: &str, value: &Bson) -> DocumentStoreResult<()> {
    match get_path_mut(body, field) {
        Some(Bson::Array(items)) => {
            items.retain(|item| !values_equal(item, value));
            Ok(())
        },
        Some(other) => Err(not_an_array("$pull", field, other)),
        None => Ok(()),
    }
}

fn not_an_array(op: &str, field: &str, found: &Bson) -> DocumentStoreError {
    DocumentStoreError::InvalidUpdate(format!(
        "cannot apply `{op}` to `{field}`: expected an array, found {:?}",
        found.element_type()
    ))
}
