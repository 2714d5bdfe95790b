// src/config.rs
//
// Catalog configuration
//
// Every field has a default, so an empty JSON object is a valid config.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "movie-catalog";
const DATABASE_FILE_NAME: &str = "movies.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Explicit database file. Defaults to `{APP_DATA}/movie-catalog/movies.db`.
    pub database_path: Option<PathBuf>,

    pub max_connections: u32,

    /// How long SQLite waits on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            max_connections: 15,
            busy_timeout_ms: 5000,
        }
    }
}

impl CatalogConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: CatalogConfig = serde_json::from_str(&raw)?;

        if config.max_connections == 0 {
            return Err(AppError::Other(
                "max_connections must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Effective database file path. The parent directory is created if missing.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => {
                let app_data_dir = dirs::data_dir().ok_or_else(|| {
                    AppError::Other("Could not determine app data directory".to_string())
                })?;
                app_data_dir.join(APP_DIR_NAME).join(DATABASE_FILE_NAME)
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(path)
    }
}
