//! Dotted field path access over nested documents.
//!
//! A path such as `schedule_details.days` is split on `.` and walked one
//! segment at a time through nested [`Document`] values. Arrays are not
//! traversed: a segment that lands on anything other than a document ends the
//! walk.

use bson::{Bson, Document};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Strips the leading `$` from a field reference such as `"$schedule_details.days"`.
///
/// Returns `None` if the value is not a `$`-prefixed reference or names no field.
pub fn field_reference(reference: &str) -> Option<&str> {
    reference
        .strip_prefix('$')
        .filter(|path| !path.is_empty())
}

/// Returns the value stored at `path`, or `None` if any segment is missing.
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Mutable counterpart of [`get_path`].
pub fn get_path_mut<'a>(document: &'a mut Document, path: &str) -> Option<&'a mut Bson> {
    let mut segments = path.split('.');
    let mut current = document.get_mut(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get_mut(segment)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Stores `value` at `path`, creating intermediate documents as needed.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidDocument`] if an intermediate segment
/// exists but holds something other than a document.
pub fn set_path(document: &mut Document, path: &str, value: Bson) -> DocumentStoreResult<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }

            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(DocumentStoreError::InvalidDocument(format!(
                    "field `{head}` is not a document and cannot hold `{rest}`"
                ))),
            }
        }
    }
}
