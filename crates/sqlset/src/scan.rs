//! Splitting raw file bytes into numbered lines.

use exn::ResultExt;
use memchr::memchr;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One logical line of a query file, without its line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// 1-based line number, used to anchor error messages.
    pub number: usize,
    pub text: &'a str,
}

/// Splits `bytes` on `\n`, stripping a trailing `\r` from each line and a
/// leading byte-order mark from the file.
///
/// Every line is checked against `max_length` (in bytes, excluding the line
/// terminator) *before* it is decoded, so binary junk reports the more useful
/// length error rather than an encoding one. A trailing newline does not
/// produce an extra empty line.
#[instrument(level = "trace", skip(bytes), fields(size = bytes.len()))]
pub(crate) fn scan<'a>(file: &str, bytes: &'a [u8], max_length: usize) -> Result<Vec<Line<'a>>> {
    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let mut lines = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let end = memchr(b'\n', &bytes[start..]).map_or(bytes.len(), |offset| start + offset);
        let number = lines.len() + 1;
        let raw = &bytes[start..end];
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.len() > max_length {
            exn::bail!(ErrorKind::MaxLineLengthExceeded { file: file.to_string(), line: number, max: max_length });
        }
        let text = std::str::from_utf8(raw).or_raise(|| ErrorKind::syntax(file, number, "line is not valid UTF-8"))?;
        lines.push(Line { number, text });
        start = end + 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn texts(bytes: &[u8]) -> Vec<&str> {
        scan("test.sql", bytes, 100).unwrap().into_iter().map(|l| l.text).collect()
    }

    #[rstest]
    #[case(b"", vec![])]
    #[case(b"\n", vec![""])]
    #[case(b"one", vec!["one"])]
    #[case(b"one\ntwo\n", vec!["one", "two"])]
    #[case(b"one\r\ntwo\r\n", vec!["one", "two"])]
    #[case(b"one\n\n\nfour", vec!["one", "", "", "four"])]
    #[case(b"\xEF\xBB\xBFone\ntwo", vec!["one", "two"])]
    fn test_split(#[case] bytes: &[u8], #[case] expected: Vec<&str>) {
        assert_eq!(texts(bytes), expected);
    }

    #[test]
    fn test_line_numbers() {
        let lines = scan("test.sql", b"a\r\n\nc", 100).unwrap();
        let numbers: Vec<usize> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_exact_max_length_is_allowed() {
        let line = "x".repeat(10);
        assert!(scan("test.sql", line.as_bytes(), 10).is_ok());
        // The carriage return of a CRLF ending doesn't count towards the limit.
        assert!(scan("test.sql", format!("{line}\r\n").as_bytes(), 10).is_ok());
    }

    #[test]
    fn test_long_line_is_rejected() {
        let bytes = format!("short\n{}\nshort", "x".repeat(11));
        let err = scan("long.sql", bytes.as_bytes(), 10).unwrap_err();
        assert_eq!(*err, ErrorKind::MaxLineLengthExceeded { file: "long.sql".into(), line: 2, max: 10 });
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = scan("binary.sql", b"fine\n\xFF\xFE\n", 100).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidSyntax { line: 2, .. }));
    }

    #[test]
    fn test_length_is_checked_before_encoding() {
        let err = scan("binary.sql", &[0xFF; 64], 16).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MaxLineLengthExceeded { line: 1, .. }));
    }
}
