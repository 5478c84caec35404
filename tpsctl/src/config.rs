//! Application configuration management.
//!
//! Configuration is merged from default values, an optional TOML file and
//! environment variables, in increasing order of precedence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tps_sqlite::config::SqliteConfig;

/// The tool's configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Database configuration (file path, creation, lock waiting)
    #[serde(default)]
    pub database: SqliteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // An in-memory database would not outlive a single command.
        Self {
            database: SqliteConfig {
                database_path: Some(PathBuf::from("placement.db")),
                ..Default::default()
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given on the command line
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Use a database file
    /// export APP_DATABASE__DATABASE_PATH="/data/placement.db"
    ///
    /// # Wait up to 30 seconds on a locked database
    /// export APP_DATABASE__BUSY_TIMEOUT="30s"
    /// ```
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = path {
            if path.exists() {
                config = config.add_source(config::File::from(path))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps APP_DATABASE__DATABASE_PATH to database.database_path
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built_config = config.build()?;
        built_config.try_deserialize().map_err(Into::into)
    }
}
