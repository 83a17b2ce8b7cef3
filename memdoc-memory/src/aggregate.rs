//! Executes parsed aggregation pipelines over in-memory documents.

use bson::{Bson, Document};

use memdoc_core::{
    error::DocumentStoreResult,
    path::{get_path, set_path},
    pipeline::{GROUP_KEY, Pipeline, Sort, SortDirection, Stage},
};

use crate::evaluator::compare_values;

/// Runs `pipeline` over `documents`, feeding each stage's output to the next.
pub(crate) fn run_pipeline(pipeline: &Pipeline, documents: Vec<Document>) -> DocumentStoreResult<Vec<Document>> {
    pipeline
        .stages()
        .iter()
        .try_fold(documents, |documents, stage| match stage {
            Stage::Unwind(path) => unwind(documents, path),
            Stage::Group(path) => Ok(group(&documents, path)),
            Stage::Sort(keys) => Ok(sort(documents, keys)),
        })
}

/// One output document per array element; documents without the path are dropped.
fn unwind(documents: Vec<Document>, path: &str) -> DocumentStoreResult<Vec<Document>> {
    let mut unwound = Vec::with_capacity(documents.len());

    for document in documents {
        match get_path(&document, path).cloned() {
            None | Some(Bson::Null) => continue,
            Some(Bson::Array(items)) => {
                for item in items {
                    let mut copy = document.clone();
                    set_path(&mut copy, path, item)?;
                    unwound.push(copy);
                }
            },
            Some(_) => unwound.push(document),
        }
    }

    Ok(unwound)
}

/// Distinct values at `path`, ascending, as `{_id: value}` documents.
fn group(documents: &[Document], path: &str) -> Vec<Document> {
    let mut values = documents
        .iter()
        .filter_map(|document| get_path(document, path))
        .filter(|value| !matches!(value, Bson::Null))
        .collect::<Vec<_>>();

    values.sort_by(|a, b| compare_values(Some(*a), Some(*b)));
    values.dedup_by(|a, b| compare_values(Some(*a), Some(*b)).is_eq());

    values
        .into_iter()
        .map(|value| {
            let mut group = Document::new();
            group.insert(GROUP_KEY, value.clone());
            group
        })
        .collect()
}

/// Stable sort by each key in turn; missing fields sort lowest.
fn sort(mut documents: Vec<Document>, keys: &[Sort]) -> Vec<Document> {
    documents.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ordering = compare_values(get_path(a, &key.field), get_path(b, &key.field));
                match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    documents
}
