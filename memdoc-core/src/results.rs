//! Acknowledgements returned by write operations.

use serde::{Deserialize, Serialize};

/// Result of [`insert_one`](crate::collection::Collection::insert_one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOneResult {
    /// The identity key the document was stored under.
    pub inserted_id: String,
}

/// Result of [`update_one`](crate::collection::Collection::update_one).
///
/// `modified_count` is 1 whenever the targeted document exists, even if the
/// update left it unchanged (for example a `$pull` of an absent value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    /// The acknowledgement for an update that found its target.
    pub fn modified() -> Self {
        Self { matched_count: 1, modified_count: 1 }
    }

    /// The acknowledgement for an update that found nothing to modify.
    pub fn unmatched() -> Self {
        Self::default()
    }
}
