//! Subcommand implementations. Output goes to any [`Write`] so the commands
//! can be tested without capturing stdout.

use exn::ResultExt;
use sqlset::SqlSet;
use std::io::Write;

use crate::error::{ErrorKind, Result};

/// One line per set: ID, number of queries, and name when it differs from
/// the ID.
pub fn check(sqlset: &SqlSet, out: &mut impl Write) -> Result<()> {
    for set in sqlset.sets() {
        let meta = set.meta();
        let plural = if set.len() == 1 { "query" } else { "queries" };
        let written = match meta.name == meta.id {
            true => writeln!(out, "{}: {} {plural}", meta.id, set.len()),
            false => writeln!(out, "{}: {} {plural} ({})", meta.id, set.len(), meta.name),
        };
        written.or_raise(|| ErrorKind::Output)?;
    }
    writeln!(out, "OK: {} query sets", sqlset.len()).or_raise(|| ErrorKind::Output)
}

/// Set metadata, either tab-separated or as a JSON array.
pub fn list(sqlset: &SqlSet, json: bool, out: &mut impl Write) -> Result<()> {
    let metas = sqlset.metas();
    if json {
        serde_json::to_writer_pretty(&mut *out, &metas).or_raise(|| ErrorKind::Output)?;
        return writeln!(out).or_raise(|| ErrorKind::Output);
    }
    for meta in metas {
        writeln!(out, "{}\t{}\t{}", meta.id, meta.name, meta.description).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

/// Prints the SQL of a single query.
pub fn get(sqlset: &SqlSet, set_id: &str, query_id: &str, out: &mut impl Write) -> Result<()> {
    let sql = sqlset.get(set_id, query_id).map_err(|err| err.raise(ErrorKind::Lookup))?;
    writeln!(out, "{sql}").or_raise(|| ErrorKind::Output)
}
