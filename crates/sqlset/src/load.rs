use exn::OptionExt;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::options::LoadOptions;
use crate::parse::parse;
use crate::registry::SqlSet;
use crate::set::QuerySet;
use crate::source::{Directory, Source};

/// Builds a [`SqlSet`] from a [`Source`].
///
/// Loading is all-or-nothing: the first defective file aborts the load and
/// its error is returned. Files are processed in sorted path order, so the
/// same input always produces the same result (and the same first error).
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}
impl From<LoadOptions> for Loader {
    fn from(options: LoadOptions) -> Self {
        Self { options }
    }
}
impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[instrument(skip_all, fields(extension = %self.options.extension))]
    pub fn load(&self, source: &impl Source) -> Result<SqlSet> {
        let mut paths: Vec<_> = source.paths()?.into_iter().filter(|p| self.options.matches(p)).collect();
        paths.sort();
        let mut sets = BTreeMap::new();
        for path in &paths {
            let set = self.parse(path, &source.read(path)?)?;
            tracing::debug!(set = set.id(), queries = set.len(), path = %path.display(), "Loaded query set");
            match sets.entry(set.id().to_string()) {
                Entry::Vacant(entry) => {
                    entry.insert(set);
                },
                Entry::Occupied(entry) => exn::bail!(ErrorKind::DuplicateSet {
                    id: entry.key().clone(),
                    file: path.display().to_string(),
                }),
            }
        }
        tracing::info!(sets = sets.len(), files = paths.len(), "Loaded query sets");
        Ok(SqlSet::new(sets))
    }

    /// Parses a single file into a [`QuerySet`]. The default set ID is the
    /// file name without its extension.
    pub fn parse(&self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<QuerySet> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_raise(|| ErrorKind::InvalidFileName(file.clone()))?;
        parse(&file, stem, bytes, self.options.max_line_length)
    }
}

impl SqlSet {
    /// Loads every `.sql` file under `root` with default options.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        Loader::default().load(&Directory::new(root.as_ref()))
    }

    /// Loads every `.sql` file embedded in `E` with default options.
    #[cfg(feature = "embed")]
    pub fn from_embedded<E: rust_embed::Embed>() -> Result<Self> {
        Loader::default().load(&crate::source::Embedded::<E>::new())
    }
}
