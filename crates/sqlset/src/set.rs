use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::meta::Metadata;

/// Descriptive information about a query set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuerySetMeta {
    /// Unique identifier for the set. The file stem, unless overridden by the
    /// file's metadata block.
    pub id: String,
    /// Human-readable name. Falls back to the ID.
    pub name: String,
    /// Longer description from the metadata block, or empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A single set of named queries, loaded from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySet {
    meta: QuerySetMeta,
    queries: BTreeMap<String, String>,
}
impl QuerySet {
    /// Merges parsed metadata with the file stem. Empty values in the
    /// metadata block count as absent.
    pub(crate) fn build(stem: &str, metadata: Metadata, queries: BTreeMap<String, String>) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        let id = present(metadata.id).unwrap_or_else(|| stem.to_string());
        let name = present(metadata.name).unwrap_or_else(|| id.clone());
        let description = metadata.description.unwrap_or_default();
        Self { meta: QuerySetMeta { id, name, description }, queries }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn meta(&self) -> &QuerySetMeta {
        &self.meta
    }

    /// The SQL body of a query, exactly as it appeared in the file (minus
    /// surrounding blank lines and trailing whitespace).
    pub fn get(&self, query_id: impl AsRef<str>) -> Option<&str> {
        self.queries.get(query_id.as_ref()).map(String::as_str)
    }

    /// Query IDs, sorted.
    pub fn query_ids(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    /// `(query ID, SQL)` pairs, sorted by ID.
    pub fn queries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.queries.iter().map(|(id, sql)| (id.as_str(), sql.as_str()))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
