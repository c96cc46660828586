use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest line (in bytes) accepted by default.
///
/// Generous for hand-written SQL, small enough that a binary file or a
/// minified blob gets caught early.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;
/// File extension of query files, without the dot.
pub const DEFAULT_EXTENSION: &str = "sql";

/// Knobs for [`Loader`](crate::Loader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Only files with this extension (case-insensitive, no leading dot) are
    /// treated as query sets. Everything else in the source is ignored.
    pub extension: String,
    /// Maximum line length in bytes.
    pub max_line_length: usize,
}
impl Default for LoadOptions {
    fn default() -> Self {
        Self { extension: DEFAULT_EXTENSION.to_string(), max_line_length: DEFAULT_MAX_LINE_LENGTH }
    }
}
impl LoadOptions {
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim().trim_start_matches('.').to_string();
        self
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Whether `path` should be loaded as a query set.
    pub(crate) fn matches(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
