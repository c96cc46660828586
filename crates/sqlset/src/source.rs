//! Where query files come from.
//!
//! A [`Source`] only has to list relative paths and hand over bytes. Deciding
//! which paths are query sets (by extension) and parsing them is the
//! [`Loader`](crate::Loader)'s job.

use exn::{OptionExt, ResultExt};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ErrorKind, Result};

pub trait Source {
    /// Relative paths of every file the source can provide.
    fn paths(&self) -> Result<Vec<PathBuf>>;

    /// Raw contents of a path previously returned by [`paths`](Self::paths).
    fn read(&self, path: &Path) -> Result<Cow<'static, [u8]>>;
}

/// Files on disk, found by recursively walking a root directory.
///
/// Symlinks are not followed.
#[derive(Debug, Clone)]
pub struct Directory {
    root: PathBuf,
}
impl Directory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
impl Source for Directory {
    fn paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.or_raise(|| ErrorKind::Io(self.root.clone()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .or_raise(|| ErrorKind::Io(entry.path().to_path_buf()))?;
            paths.push(relative.to_path_buf());
        }
        Ok(paths)
    }

    fn read(&self, path: &Path) -> Result<Cow<'static, [u8]>> {
        let absolute = self.root.join(path);
        let bytes = std::fs::read(&absolute).or_raise(|| ErrorKind::Io(absolute.clone()))?;
        Ok(Cow::Owned(bytes))
    }
}

/// Files held in memory. Handy for tests and generated queries.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    files: BTreeMap<PathBuf, Cow<'static, [u8]>>,
}
impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Cow<'static, [u8]>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}
impl<P, C> FromIterator<(P, C)> for Memory
where
    P: Into<PathBuf>,
    C: Into<Cow<'static, [u8]>>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self { files: iter.into_iter().map(|(p, c)| (p.into(), c.into())).collect() }
    }
}
impl Source for Memory {
    fn paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, path: &Path) -> Result<Cow<'static, [u8]>> {
        self.files.get(path).cloned().ok_or_raise(|| ErrorKind::Io(path.to_path_buf()))
    }
}

/// Files embedded into the binary with [`rust_embed`].
///
/// ```ignore
/// #[derive(rust_embed::Embed)]
/// #[folder = "queries/"]
/// struct Queries;
///
/// let sqlset = sqlset::SqlSet::from_embedded::<Queries>()?;
/// ```
#[cfg(feature = "embed")]
pub struct Embedded<E> {
    _embed: std::marker::PhantomData<E>,
}
#[cfg(feature = "embed")]
impl<E: rust_embed::Embed> Embedded<E> {
    pub fn new() -> Self {
        Self { _embed: std::marker::PhantomData }
    }
}
#[cfg(feature = "embed")]
impl<E: rust_embed::Embed> Default for Embedded<E> {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(feature = "embed")]
impl<E: rust_embed::Embed> Source for Embedded<E> {
    fn paths(&self) -> Result<Vec<PathBuf>> {
        Ok(E::iter().map(|name| PathBuf::from(name.as_ref())).collect())
    }

    fn read(&self, path: &Path) -> Result<Cow<'static, [u8]>> {
        path.to_str()
            .and_then(E::get)
            .map(|file| file.data)
            .ok_or_raise(|| ErrorKind::Io(path.to_path_buf()))
    }
}
