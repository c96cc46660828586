//! Turning one query file into a [`QuerySet`].
//!
//! ```sql
//! -- Comments and blank lines are fine before the first query.
//! --META {"name": "User queries"}
//!
//! --SQL:GetUserByID
//! SELECT id, name FROM users WHERE id = $1;
//!
//! --SQL:DeleteUser
//! DELETE FROM users WHERE id = $1;
//! ```
//!
//! A query runs from its `--SQL:<id>` marker to the next marker or the end of
//! the file. Query IDs are restricted to ASCII letters, digits, `_` and `-`.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::meta::{MetaBlock, Metadata};
use crate::scan::{Line, scan};
use crate::set::QuerySet;

pub(crate) const META_MARKER: &str = "--META";
pub(crate) const QUERY_MARKER: &str = "--SQL";

static QUERY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// What a single line means structurally.
#[derive(Debug, PartialEq, Eq)]
enum Marker<'a> {
    /// A fragment of the metadata payload.
    Meta(&'a str),
    /// Opens a query with the given ID.
    Query(&'a str),
}

/// Recognises marker lines. Returns `None` for everything else (SQL, blank
/// lines, ordinary comments).
///
/// Lines that clearly *try* to be a query marker but get it wrong are errors
/// instead of comments; otherwise a typo would silently glue two queries
/// together. A bare `--SQL` only counts as an attempt at the start of a line.
fn classify<'a>(file: &str, line: &Line<'a>) -> Result<Option<Marker<'a>>> {
    let text = line.text.trim_start();
    let unindented = text.len() == line.text.len();
    if let Some(rest) = text.strip_prefix(META_MARKER) {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Ok(Some(Marker::Meta(rest.trim_start())));
        }
    }
    if let Some(rest) = text.strip_prefix(QUERY_MARKER) {
        match rest.strip_prefix(':') {
            Some(id) => {
                let id = id.trim_end();
                if id.is_empty() {
                    exn::bail!(ErrorKind::syntax(file, line.number, "empty query id"));
                }
                if !QUERY_ID.is_match(id) {
                    exn::bail!(ErrorKind::syntax(
                        file,
                        line.number,
                        format!("invalid query id '{id}': only letters, digits, '_' and '-' are allowed"),
                    ));
                }
                return Ok(Some(Marker::Query(id)));
            },
            // Only unindented lines; indented ones are comments inside a body.
            None if unindented && (rest.is_empty() || rest.starts_with(char::is_whitespace)) => {
                exn::bail!(ErrorKind::syntax(file, line.number, "malformed query marker, expected `--SQL:<id>`"));
            },
            // Something like `--SQLite only`, just a comment.
            None => {},
        }
    }
    Ok(None)
}

/// A query whose body is still being collected.
#[derive(Debug)]
struct OpenQuery<'a> {
    id: &'a str,
    line: usize,
    body: Vec<&'a str>,
}

struct Parser<'a> {
    file: &'a str,
    metadata: Option<Metadata>,
    block: Option<MetaBlock<'a>>,
    current: Option<OpenQuery<'a>>,
    queries: BTreeMap<String, String>,
}
impl<'a> Parser<'a> {
    fn new(file: &'a str) -> Self {
        Self { file, metadata: None, block: None, current: None, queries: BTreeMap::new() }
    }

    fn line(&mut self, line: Line<'a>) -> Result<()> {
        let marker = classify(self.file, &line)?;
        if !matches!(marker, Some(Marker::Meta(_))) {
            self.close_block()?;
        }
        match marker {
            Some(Marker::Meta(fragment)) => self.meta(&line, fragment),
            Some(Marker::Query(id)) => {
                self.close_query()?;
                self.current = Some(OpenQuery { id, line: line.number, body: Vec::new() });
                Ok(())
            },
            None => match &mut self.current {
                Some(query) => {
                    query.body.push(line.text);
                    Ok(())
                },
                None => Self::preamble(self.file, &line),
            },
        }
    }

    fn meta(&mut self, line: &Line<'a>, fragment: &'a str) -> Result<()> {
        if self.current.is_some() {
            exn::bail!(ErrorKind::syntax(self.file, line.number, "metadata block must precede all queries"));
        }
        if let Some(block) = &mut self.block {
            block.push(fragment);
            return Ok(());
        }
        if self.metadata.is_some() {
            exn::bail!(ErrorKind::syntax(self.file, line.number, "duplicate metadata block"));
        }
        self.block = Some(MetaBlock::new(line, fragment));
        Ok(())
    }

    /// Before the first query only blank lines and comments are allowed.
    /// Anything else is almost certainly SQL that's missing its marker.
    fn preamble(file: &str, line: &Line<'_>) -> Result<()> {
        let text = line.text.trim();
        if text.is_empty() || text.starts_with("--") {
            return Ok(());
        }
        exn::bail!(ErrorKind::syntax(file, line.number, "SQL text outside of a query block"))
    }

    fn close_block(&mut self) -> Result<()> {
        if let Some(block) = self.block.take() {
            self.metadata = Some(block.finish(self.file)?);
        }
        Ok(())
    }

    fn close_query(&mut self) -> Result<()> {
        let Some(query) = self.current.take() else {
            return Ok(());
        };
        let start = query.body.iter().position(|l| !l.trim().is_empty()).unwrap_or(query.body.len());
        let sql = query.body[start..].join("\n").trim_end().to_string();
        if sql.is_empty() {
            tracing::warn!(file = self.file, line = query.line, query = query.id, "Query has an empty body");
        }
        if self.queries.contains_key(query.id) {
            exn::bail!(ErrorKind::syntax(self.file, query.line, format!("duplicate query id '{}'", query.id)));
        }
        self.queries.insert(query.id.to_string(), sql);
        Ok(())
    }

    fn finish(mut self, stem: &str) -> Result<QuerySet> {
        self.close_block()?;
        self.close_query()?;
        Ok(QuerySet::build(stem, self.metadata.unwrap_or_default(), self.queries))
    }
}

/// Parses one file. `file` is only used in error messages, `stem` is the
/// default set ID.
#[instrument(level = "trace", skip(bytes), fields(size = bytes.len()))]
pub(crate) fn parse(file: &str, stem: &str, bytes: &[u8], max_line_length: usize) -> Result<QuerySet> {
    let mut parser = Parser::new(file);
    for line in scan(file, bytes, max_line_length)? {
        parser.line(line)?;
    }
    parser.finish(stem)
}
