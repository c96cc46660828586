use exn::OptionExt;
use std::collections::BTreeMap;

use crate::error::{ErrorKind, Result};
use crate::set::{QuerySet, QuerySetMeta};

/// Something that can hand out SQL by `(set ID, query ID)`.
pub trait QueryProvider {
    /// Looks up a query. Fails with [`ErrorKind::SetNotFound`] or
    /// [`ErrorKind::QueryNotFound`].
    fn get(&self, set_id: &str, query_id: &str) -> Result<&str>;

    /// Like [`get`](Self::get), but panics if the query doesn't exist.
    ///
    /// Only for queries the program cannot run without, e.g. ones referenced
    /// by constant names and shipped with the binary.
    #[track_caller]
    fn must_get(&self, set_id: &str, query_id: &str) -> &str {
        match self.get(set_id, query_id) {
            Ok(sql) => sql,
            Err(err) => panic!("{}", *err),
        }
    }
}

/// Something that can describe the query sets it holds.
pub trait MetaProvider {
    fn metas(&self) -> Vec<QuerySetMeta>;
}

/// Every loaded query set, keyed by set ID.
///
/// Built once by a [`Loader`](crate::Loader) and never modified afterwards,
/// so a single instance can be shared between threads (directly or behind an
/// [`Arc`](std::sync::Arc)) without locking. To pick up changed files, load a
/// new `SqlSet` and swap it in whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlSet {
    sets: BTreeMap<String, QuerySet>,
}
impl SqlSet {
    pub(crate) fn new(sets: BTreeMap<String, QuerySet>) -> Self {
        Self { sets }
    }

    pub fn set(&self, set_id: impl AsRef<str>) -> Option<&QuerySet> {
        self.sets.get(set_id.as_ref())
    }

    /// All query sets, sorted by ID.
    pub fn sets(&self) -> impl Iterator<Item = &QuerySet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// See [`QueryProvider::get`].
    pub fn get(&self, set_id: &str, query_id: &str) -> Result<&str> {
        let set = self.set(set_id).ok_or_raise(|| ErrorKind::SetNotFound(set_id.to_string()))?;
        set.get(query_id)
            .ok_or_raise(|| ErrorKind::QueryNotFound { set: set_id.to_string(), query: query_id.to_string() })
    }

    /// See [`QueryProvider::must_get`].
    #[track_caller]
    pub fn must_get(&self, set_id: &str, query_id: &str) -> &str {
        QueryProvider::must_get(self, set_id, query_id)
    }

    /// Metadata of every loaded set. Currently sorted by ID, but don't rely on
    /// the order.
    pub fn metas(&self) -> Vec<QuerySetMeta> {
        self.sets.values().map(|set| set.meta().clone()).collect()
    }
}
impl QueryProvider for SqlSet {
    fn get(&self, set_id: &str, query_id: &str) -> Result<&str> {
        SqlSet::get(self, set_id, query_id)
    }
}
impl MetaProvider for SqlSet {
    fn metas(&self) -> Vec<QuerySetMeta> {
        SqlSet::metas(self)
    }
}
impl<T: QueryProvider + ?Sized> QueryProvider for std::sync::Arc<T> {
    fn get(&self, set_id: &str, query_id: &str) -> Result<&str> {
        (**self).get(set_id, query_id)
    }
}
impl<T: QueryProvider + ?Sized> QueryProvider for &T {
    fn get(&self, set_id: &str, query_id: &str) -> Result<&str> {
        (**self).get(set_id, query_id)
    }
}
