//! Database Helper Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A database helper error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for database helper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The query doesn't exist. The `sqlset` lookup error is kept as a child
    /// in the error tree.
    #[display("no such query: {set}:{query}")]
    Lookup { set: String, query: String },
    /// The query exists but running it failed (including "no rows" for
    /// single-row fetches).
    #[display("query {set}:{query} failed")]
    Database { set: String, query: String },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Might be a busy database or a dropped connection. A missing query
        // stays missing.
        matches!(self, Self::Database { .. })
    }
}
