//! Query Set Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A query set error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for query set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
///
/// ### Load Errors
/// The source files are defective; fix the file and restart. No partially
/// loaded [`SqlSet`](crate::SqlSet) is ever handed out alongside these.
/// - [`ErrorKind::InvalidSyntax`]
/// - [`ErrorKind::MaxLineLengthExceeded`]
/// - [`ErrorKind::DuplicateSet`]
/// - [`ErrorKind::InvalidFileName`]
/// - [`ErrorKind::Io`]
///
/// ### Lookup Errors
/// - [`ErrorKind::SetNotFound`]
/// - [`ErrorKind::QueryNotFound`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed metadata payload, unknown metadata key, malformed query
    /// marker, or content in a place the grammar does not allow.
    #[display("{file}:{line}: invalid syntax: {detail}")]
    InvalidSyntax {
        /// The file being parsed.
        file: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        detail: String,
    },
    /// A line is longer than the configured maximum (in bytes).
    #[display("{file}:{line}: line exceeds the maximum length of {max} bytes")]
    MaxLineLengthExceeded {
        /// The file being parsed.
        file: String,
        /// 1-based line number.
        line: usize,
        /// The configured maximum.
        max: usize,
    },
    /// Two files resolved to the same set ID.
    #[display("duplicate query set id '{id}' declared by {file}")]
    DuplicateSet {
        /// The final (post-defaulting) set ID.
        id: String,
        /// The file that tried to claim the ID second.
        file: String,
    },
    /// The file name cannot provide a set ID (empty or non-UTF-8 stem).
    #[display("invalid query set file name: {_0}")]
    InvalidFileName(#[error(not(source))] String),
    /// Reading from the source failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// No set with this ID was loaded.
    #[display("query set not found: {_0}")]
    SetNotFound(#[error(not(source))] String),
    /// The set exists but has no query with this ID.
    #[display("query not found: {set}:{query}")]
    QueryNotFound { set: String, query: String },
}

impl ErrorKind {
    /// Shorthand for building [`ErrorKind::InvalidSyntax`].
    pub(crate) fn syntax(file: impl Into<String>, line: usize, detail: impl Into<String>) -> Self {
        Self::InvalidSyntax { file: file.into(), line, detail: detail.into() }
    }

    /// Returns `true` for both lookup failures, for callers that don't care
    /// whether it was the set or the query that was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SetNotFound(_) | Self::QueryNotFound { .. })
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Query files are either valid or they're not; reading them again
        // won't change that.
        false
    }
}
