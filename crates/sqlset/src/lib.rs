//! Named SQL queries, kept in plain `.sql` files instead of Rust strings.
//!
//! Every file is one *query set*. Its file name (without extension) is the
//! set ID, unless the file's metadata block says otherwise. Inside, each query
//! is introduced by a `--SQL:<id>` marker and runs until the next marker:
//!
//! ```sql
//! --META {"name": "Users", "description": "Everything about users"}
//!
//! --SQL:GetUserByID
//! SELECT id, name, email FROM users WHERE id = $1;
//!
//! --SQL:CreateUser
//! INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id;
//! ```
//!
//! Query bodies are opaque: they are neither parsed nor templated, so driver
//! placeholders reach the driver untouched.
//!
//! Files are validated strictly when loading. Any malformed marker, unknown
//! metadata field or overlong line fails the whole load, so a [`SqlSet`] you
//! get back is always complete:
//!
//! ```
//! use sqlset::{Loader, Memory};
//!
//! let source = Memory::new().with_file("users.sql", b"--SQL:GetUserByID\nSELECT * FROM users WHERE id = $1;".as_slice());
//! let sqlset = Loader::default().load(&source).unwrap();
//! assert_eq!(sqlset.get("users", "GetUserByID").unwrap(), "SELECT * FROM users WHERE id = $1;");
//! assert!(sqlset.get("users", "DeleteUser").unwrap_err().is_not_found());
//! ```

pub mod error;
mod load;
mod meta;
mod options;
mod parse;
mod registry;
mod scan;
mod set;
mod source;

pub use crate::load::Loader;
pub use crate::options::{DEFAULT_EXTENSION, DEFAULT_MAX_LINE_LENGTH, LoadOptions};
pub use crate::registry::{MetaProvider, QueryProvider, SqlSet};
pub use crate::set::{QuerySet, QuerySetMeta};
#[cfg(feature = "embed")]
pub use crate::source::Embedded;
pub use crate::source::{Directory, Memory, Source};
