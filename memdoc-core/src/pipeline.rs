//! Aggregation pipeline parsing.
//!
//! A pipeline is an ordered list of single-key stage documents:
//!
//! ```ignore
//! use bson::doc;
//!
//! let pipeline = vec![
//!     doc! { "$unwind": "$schedule_details.days" },
//!     doc! { "$group": { "_id": "$schedule_details.days" } },
//!     doc! { "$sort": { "_id": 1 } },
//! ];
//! ```
//!
//! Stages run strictly in order, each consuming the output of the previous one.

use bson::{Bson, Document};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    path::field_reference,
    query::ParseOptions,
};

/// Key of the synthetic documents produced by `$group`.
pub const GROUP_KEY: &str = "_id";

/// Sort direction for `$sort` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (lowest first, missing fields first).
    Asc,
    /// Descending order.
    Desc,
}

/// One key of a `$sort` stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The dotted field path to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// A single pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Emit one document per element of the array at the path.
    Unwind(String),
    /// Replace the working set with one `{_id: value}` per distinct value at the path.
    Group(String),
    /// Stable reorder by the given keys, compared in order.
    Sort(Vec<Sort>),
}

/// A parsed aggregation pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Parses a list of stage documents.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPipeline`] if a stage is not a
    /// single-key document, if a stage argument has the wrong shape, or if an
    /// unknown stage is used while `strict_operators` is set.
    pub fn parse(stages: &[Document], options: &ParseOptions<'_>) -> DocumentStoreResult<Self> {
        let mut parsed = Vec::with_capacity(stages.len());

        for stage in stages {
            let mut entries = stage.iter();
            let (name, spec) = match (entries.next(), entries.next()) {
                (Some(entry), None) => entry,
                _ => {
                    return Err(DocumentStoreError::InvalidPipeline(format!(
                        "a stage must have exactly one key, got {} keys",
                        stage.len()
                    )));
                }
            };

            match name.as_str() {
                "$unwind" => parsed.push(Stage::Unwind(parse_unwind(spec)?)),
                "$group" => parsed.push(Stage::Group(parse_group(spec, options)?)),
                "$sort" => parsed.push(Stage::Sort(parse_sort(spec)?)),
                other => options.unsupported(DocumentStoreError::InvalidPipeline(format!(
                    "unsupported stage `{other}`"
                )))?,
            }
        }

        Ok(Self { stages: parsed })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

fn parse_unwind(spec: &Bson) -> DocumentStoreResult<String> {
    let reference = match spec {
        Bson::String(reference) => Some(reference.as_str()),
        Bson::Document(options) => options.get("path").and_then(Bson::as_str),
        _ => None,
    };

    reference
        .and_then(field_reference)
        .map(str::to_string)
        .ok_or_else(|| {
            DocumentStoreError::InvalidPipeline(
                "`$unwind` requires a field path such as \"$tags\"".to_string(),
            )
        })
}

fn parse_group(spec: &Bson, options: &ParseOptions<'_>) -> DocumentStoreResult<String> {
    let Bson::Document(spec) = spec else {
        return Err(DocumentStoreError::InvalidPipeline(
            "`$group` requires a document".to_string(),
        ));
    };

    for accumulator in spec.keys().filter(|key| key.as_str() != GROUP_KEY) {
        options.unsupported(DocumentStoreError::InvalidPipeline(format!(
            "unsupported `$group` accumulator `{accumulator}`"
        )))?;
    }

    spec.get(GROUP_KEY)
        .and_then(Bson::as_str)
        .and_then(field_reference)
        .map(str::to_string)
        .ok_or_else(|| {
            DocumentStoreError::InvalidPipeline(
                "`$group` requires `_id` to be a field path such as \"$tags\"".to_string(),
            )
        })
}

fn parse_sort(spec: &Bson) -> DocumentStoreResult<Vec<Sort>> {
    let keys = match spec {
        Bson::Document(keys) if !keys.is_empty() => keys,
        _ => {
            return Err(DocumentStoreError::InvalidPipeline(
                "`$sort` requires a non-empty document of field/direction pairs".to_string(),
            ));
        }
    };

    keys.iter()
        .map(|(field, direction)| {
            let direction = match direction {
                Bson::Int32(1) | Bson::Int64(1) => SortDirection::Asc,
                Bson::Int32(-1) | Bson::Int64(-1) => SortDirection::Desc,
                Bson::Double(d) if *d == 1.0 => SortDirection::Asc,
                Bson::Double(d) if *d == -1.0 => SortDirection::Desc,
                other => {
                    return Err(DocumentStoreError::InvalidPipeline(format!(
                        "invalid sort direction {other} for `{field}`, expected 1 or -1"
                    )));
                }
            };

            Ok(Sort { field: field.clone(), direction })
        })
        .collect()
}
