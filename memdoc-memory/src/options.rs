//! Configuration for [`InMemoryStore`](crate::InMemoryStore).

use serde::{Deserialize, Serialize};

use memdoc_core::query::{DEFAULT_IDENTITY_FIELD, ParseOptions};

/// Settings for an in-memory store.
///
/// The struct derives serde so an application can keep it in its own config
/// file and hand it to [`InMemoryStoreBuilder::from_options`](crate::InMemoryStoreBuilder::from_options).
/// Missing fields take their defaults.
///
/// ```ignore
/// let options: StoreOptions = serde_json::from_str(r#"{ "strict_operators": true }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Field under which identity keys are accepted on insert and exposed on read.
    pub identity_field: String,
    /// Reject unknown query operators, update operators and pipeline stages
    /// instead of logging and ignoring them.
    pub strict_operators: bool,
    /// Collections created when the store is built.
    pub collections: Vec<String>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            strict_operators: false,
            collections: Vec::new(),
        }
    }
}

impl StoreOptions {
    pub(crate) fn parse_options(&self) -> ParseOptions<'_> {
        ParseOptions::new(&self.identity_field, self.strict_operators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: StoreOptions = serde_json::from_str(r#"{ "strict_operators": true }"#).unwrap();

        assert_eq!(
            options,
            StoreOptions { strict_operators: true, ..StoreOptions::default() }
        );
        assert_eq!(options.identity_field, "_id");
    }
}
