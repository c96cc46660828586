//! The optional metadata block at the top of a query file.
//!
//! A metadata block is a run of consecutive `--META` lines. Everything after
//! the marker is a fragment of a single JSON object:
//!
//! ```sql
//! --META {
//! --META   "id": "users",
//! --META   "name": "User queries"
//! --META }
//! ```
//!
//! Only `id`, `name` and `description` are recognised. Anything else is an
//! error rather than silently ignored, so a typo like `"descripton"` doesn't
//! quietly drop the description.

use exn::ResultExt;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::scan::Line;

/// The metadata record as written in the file, before any defaulting.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Metadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Accumulates the payload fragments of one metadata block.
#[derive(Debug)]
pub(crate) struct MetaBlock<'a> {
    start: usize,
    fragments: Vec<&'a str>,
}
impl<'a> MetaBlock<'a> {
    pub fn new(first: &Line<'a>, fragment: &'a str) -> Self {
        Self { start: first.number, fragments: vec![fragment] }
    }

    pub fn push(&mut self, fragment: &'a str) {
        self.fragments.push(fragment);
    }

    /// Parses the joined fragments as a strict JSON object.
    ///
    /// Errors point at the source line serde reported, translated from a line
    /// within the payload to a line within the file.
    #[instrument(level = "trace", skip(self), fields(start = self.start, lines = self.fragments.len()))]
    pub fn finish(self, file: &str) -> Result<Metadata> {
        let payload = self.fragments.join("\n");
        match serde_json::from_str(&payload) {
            Ok(meta) => Ok(meta),
            Err(err) => {
                // serde counts lines from 1, and reports 0 for some EOF errors.
                let line = self.start + err.line().max(1) - 1;
                let detail = format!("invalid metadata: {err}");
                Err(err).or_raise(|| ErrorKind::syntax(file, line, detail))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(fragments: &[&'static str]) -> Result<Metadata> {
        let first = Line { number: 3, text: "" };
        let mut block = MetaBlock::new(&first, fragments[0]);
        for fragment in &fragments[1..] {
            block.push(fragment);
        }
        block.finish("test.sql")
    }

    #[test]
    fn test_all_fields() {
        let meta = parse(&["{", r#""id": "users","#, r#""name": "Users","#, r#""description": "All of them""#, "}"])
            .unwrap();
        assert_eq!(
            meta,
            Metadata {
                id: Some("users".into()),
                name: Some("Users".into()),
                description: Some("All of them".into()),
            }
        );
    }

    #[rstest]
    #[case(&["{}"])]
    #[case(&["{", "}"])]
    #[case(&[r#"{"id": null}"#])]
    fn test_everything_is_optional(#[case] fragments: &[&'static str]) {
        assert_eq!(parse(fragments).unwrap(), Metadata::default());
    }

    #[rstest]
    // Malformed JSON.
    #[case(&["{", r#""name": "Users""#])]
    #[case(&[r#"{"name": 'Users'}"#])]
    #[case(&[""])]
    #[case(&[r#""just a string""#])]
    // Well-formed, but not what we expect.
    #[case(&[r#"{"nmae": "Users"}"#])]
    #[case(&[r#"{"name": 42}"#])]
    #[case(&[r#"{"description": ["a", "b"]}"#])]
    fn test_invalid(#[case] fragments: &[&'static str]) {
        let err = parse(fragments).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidSyntax { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn test_error_points_at_offending_line() {
        // Block starts on line 3, the unknown key is on the block's third line.
        let err = parse(&["{", r#""name": "Users","#, r#""nmae": "Typo""#, "}"]).unwrap_err();
        match &*err {
            ErrorKind::InvalidSyntax { file, line, detail } => {
                assert_eq!(file, "test.sql");
                assert_eq!(*line, 5);
                assert!(detail.contains("nmae"), "detail should name the key: {detail}");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
