//! Runs queries from a [`sqlset::SqlSet`] against a SQLite pool.
//!
//! Two flavours are offered. The builders ([`DbHelper::query`],
//! [`DbHelper::query_as`]) resolve the SQL and hand back an ordinary sqlx
//! query to `.bind()` and fetch as usual. The one-shot methods
//! ([`DbHelper::fetch_one`], [`DbHelper::fetch_all`], [`DbHelper::execute`])
//! take pre-built [`SqliteArguments`] and do the whole round trip.
//!
//! ```no_run
//! # use sqlset_sqlx::DbHelper;
//! # async fn example(pool: sqlx::SqlitePool, sqlset: sqlset::SqlSet) -> sqlset_sqlx::error::Result<()> {
//! #[derive(sqlx::FromRow)]
//! struct User { id: i64, name: String }
//!
//! let db = DbHelper::new(pool, sqlset);
//! let user: User = db.query_as("users", "GetUserByID")?.bind(42).fetch_one(db.pool()).await.unwrap();
//! # Ok(())
//! # }
//! ```

pub mod error;

use exn::ResultExt;
use sqlset::QueryProvider;
use sqlx::FromRow;
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// A connection pool paired with the queries to run on it.
#[derive(Debug, Clone)]
pub struct DbHelper<P> {
    pool: SqlitePool,
    queries: P,
}
impl<P: QueryProvider> DbHelper<P> {
    pub fn new(pool: SqlitePool, queries: P) -> Self {
        Self { pool, queries }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn queries(&self) -> &P {
        &self.queries
    }

    fn sql(&self, set_id: &str, query_id: &str) -> Result<&str> {
        self.queries
            .get(set_id, query_id)
            .map_err(|err| err.raise(ErrorKind::Lookup { set: set_id.to_string(), query: query_id.to_string() }))
    }

    fn failed(set_id: &str, query_id: &str) -> impl FnOnce() -> ErrorKind {
        move || ErrorKind::Database { set: set_id.to_string(), query: query_id.to_string() }
    }

    /// A plain query, ready for `.bind()`.
    pub fn query(&self, set_id: &str, query_id: &str) -> Result<Query<'_, Sqlite, SqliteArguments<'_>>> {
        Ok(sqlx::query(self.sql(set_id, query_id)?))
    }

    /// A query mapping rows to `T`, ready for `.bind()`.
    pub fn query_as<T>(&self, set_id: &str, query_id: &str) -> Result<QueryAs<'_, Sqlite, T, SqliteArguments<'_>>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        Ok(sqlx::query_as(self.sql(set_id, query_id)?))
    }

    /// Runs the query and maps exactly one row into `T`. No rows is an error.
    #[instrument(skip(self, args))]
    pub async fn fetch_one<'q, T>(&'q self, set_id: &str, query_id: &str, args: SqliteArguments<'q>) -> Result<T>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let sql = self.sql(set_id, query_id)?;
        sqlx::query_as_with::<Sqlite, T, _>(sql, args)
            .fetch_one(&self.pool)
            .await
            .or_raise(Self::failed(set_id, query_id))
    }

    /// Runs the query and maps every row into `T`.
    #[instrument(skip(self, args))]
    pub async fn fetch_all<'q, T>(&'q self, set_id: &str, query_id: &str, args: SqliteArguments<'q>) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let sql = self.sql(set_id, query_id)?;
        sqlx::query_as_with::<Sqlite, T, _>(sql, args)
            .fetch_all(&self.pool)
            .await
            .or_raise(Self::failed(set_id, query_id))
    }

    /// Runs a statement that doesn't return rows (`INSERT`, `UPDATE`,
    /// `DELETE`, DDL) and returns the number of affected rows.
    #[instrument(skip(self, args))]
    pub async fn execute<'q>(&'q self, set_id: &str, query_id: &str, args: SqliteArguments<'q>) -> Result<u64> {
        let sql = self.sql(set_id, query_id)?;
        let result = sqlx::query_with::<Sqlite, _>(sql, args)
            .execute(&self.pool)
            .await
            .or_raise(Self::failed(set_id, query_id))?;
        tracing::trace!(rows = result.rows_affected(), "Executed statement");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sqlset::{Loader, Memory, SqlSet};
    use sqlx::Arguments;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    const SCHEMA: &str = "--SQL:CreateUsers
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL
);
";

    const USERS: &str = "--META {\"name\": \"Users\"}

--SQL:Insert
INSERT INTO users (name, email) VALUES (?1, ?2);

--SQL:GetByID
SELECT id, name, email FROM users WHERE id = ?1;

--SQL:All
SELECT id, name, email FROM users ORDER BY id;

--SQL:Rename
UPDATE users SET name = ?2 WHERE id = ?1;

--SQL:Broken
SELECT nothing FROM nowhere;
";

    #[derive(Debug, PartialEq, Eq, sqlx::FromRow)]
    struct User {
        id: i64,
        name: String,
        email: String,
    }

    fn queries() -> SqlSet {
        let source = Memory::new().with_file("schema.sql", SCHEMA.as_bytes()).with_file("users.sql", USERS.as_bytes());
        Loader::default().load(&source).unwrap()
    }

    fn args<'q>(values: &[&'q str]) -> SqliteArguments<'q> {
        let mut args = SqliteArguments::default();
        for value in values {
            args.add(*value).unwrap();
        }
        args
    }

    async fn helper() -> DbHelper<Arc<SqlSet>> {
        // In-memory databases must be limited to one connection, otherwise
        // each connection sees its own empty database.
        let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
        let db = DbHelper::new(pool, Arc::new(queries()));
        db.execute("schema", "CreateUsers", SqliteArguments::default()).await.unwrap();
        for (name, email) in [("Igor", "igor@example.com"), ("Alexey", "alex@example.com")] {
            assert_eq!(db.execute("users", "Insert", args(&[name, email])).await.unwrap(), 1);
        }
        db
    }

    #[rstest]
    #[case(1, "Igor", "igor@example.com")]
    #[case(2, "Alexey", "alex@example.com")]
    #[tokio::test]
    async fn test_fetch_one(#[case] id: i64, #[case] name: &str, #[case] email: &str) {
        let db = helper().await;
        let mut by_id = SqliteArguments::default();
        by_id.add(id).unwrap();
        let user: User = db.fetch_one("users", "GetByID", by_id).await.unwrap();
        assert_eq!(user, User { id, name: name.into(), email: email.into() });
    }

    #[tokio::test]
    async fn test_fetch_one_without_rows() {
        let db = helper().await;
        let mut by_id = SqliteArguments::default();
        by_id.add(99_i64).unwrap();
        let err = db.fetch_one::<User>("users", "GetByID", by_id).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database { set: "users".into(), query: "GetByID".into() });
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let db = helper().await;
        let users: Vec<User> = db.fetch_all("users", "All", SqliteArguments::default()).await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Igor", "Alexey"]);
    }

    #[tokio::test]
    async fn test_execute_reports_affected_rows() {
        let db = helper().await;
        let mut rename = SqliteArguments::default();
        rename.add(1_i64).unwrap();
        rename.add("Igor Renamed").unwrap();
        assert_eq!(db.execute("users", "Rename", rename).await.unwrap(), 1);

        let mut missing = SqliteArguments::default();
        missing.add(99_i64).unwrap();
        missing.add("Nobody").unwrap();
        assert_eq!(db.execute("users", "Rename", missing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_builders() {
        let db = helper().await;
        let user: User = db.query_as("users", "GetByID").unwrap().bind(1_i64).fetch_one(db.pool()).await.unwrap();
        assert_eq!(user.name, "Igor");

        let result = db.query("users", "Rename").unwrap().bind(1_i64).bind("Igor").execute(db.pool()).await.unwrap();
        assert_eq!(result.rows_affected(), 1);
    }

    #[tokio::test]
    async fn test_unknown_query() {
        let db = helper().await;
        let err = db.execute("users", "Nope", SqliteArguments::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Lookup { set: "users".into(), query: "Nope".into() });
        assert!(!err.is_retryable());
        assert!(db.query("nope", "Insert").is_err());
    }

    #[tokio::test]
    async fn test_invalid_sql_is_a_database_error() {
        let db = helper().await;
        let err = db.fetch_all::<User>("users", "Broken", SqliteArguments::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Database { query, .. } if query == "Broken"));
    }
}
