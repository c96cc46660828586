//! Layered configuration for loading query sets.
//!
//! Settings are merged from (later wins):
//! 1. built-in defaults,
//! 2. `sqlset.toml` in the user's config directory,
//! 3. `sqlset.toml` in the working directory (or its nearest parent),
//! 4. an explicitly given file, which must exist,
//! 5. `SQLSET_*` environment variables (`SQLSET_MAX_LINE_LENGTH=8192`).
//!
//! ```toml
//! directory = "db/queries"
//! extension = "sql"
//! max_line_length = 4096
//! ```

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sqlset::{DEFAULT_EXTENSION, DEFAULT_MAX_LINE_LENGTH, LoadOptions};
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

pub const FILE_NAME: &str = "sqlset.toml";
pub const ENV_PREFIX: &str = "SQLSET_";
const DEFAULT_DIRECTORY: &str = "queries";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory searched (recursively) for query files.
    pub directory: PathBuf,
    /// Extension of query files, without the dot.
    pub extension: String,
    /// Longest accepted line, in bytes.
    pub max_line_length: usize,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            extension: DEFAULT_EXTENSION.to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}
impl Settings {
    /// The full provider stack, exposed so callers can merge in their own
    /// overrides (command-line flags, mostly) before extracting.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(dirs) = ProjectDirs::from("", "", "sqlset") {
            figment = figment.merge(Toml::file(dirs.config_dir().join(FILE_NAME)));
        }
        figment = figment.merge(Toml::file(FILE_NAME));
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads settings from every layer. See the [crate docs](crate).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(explicit))
    }

    #[instrument(skip_all)]
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract().or_raise(|| ErrorKind::Extract)?;
        settings.validate()?;
        tracing::debug!(?settings, "Loaded configuration");
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.max_line_length == 0 {
            exn::bail!(ErrorKind::Invalid { key: "max_line_length", reason: "must be greater than zero".into() });
        }
        if self.extension.trim().trim_start_matches('.').is_empty() {
            exn::bail!(ErrorKind::Invalid { key: "extension", reason: "must not be empty".into() });
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default().with_extension(&self.extension).with_max_line_length(self.max_line_length)
    }
}
