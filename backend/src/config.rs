//! # Backend Configuration
//!
//! Resolves where Meadow keeps its data and how it logs.
//!
//! Resolution order for the data directory:
//! 1. `MEADOW_DATA_DIR` environment variable
//! 2. the platform data directory (`~/.local/share/Meadow`, `~/Library/Application Support/Meadow`, ...)
//!
//! An optional `config.yaml` inside the data directory may override the
//! database file name and the log filter:
//!
//! ```yaml
//! database_file: "meadow.db"
//! log_filter: "meadow_backend=debug"
//! ```

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "MEADOW_DATA_DIR";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
const DEFAULT_DATABASE_FILE: &str = "meadow.db";
const DEFAULT_LOG_FILTER: &str = "info";
const APP_DIRECTORY_NAME: &str = "Meadow";

/// Settings read from `config.yaml`; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub database_file: Option<String>,
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub data_directory: PathBuf,
    pub database_file: String,
    pub log_filter: String,
}

impl BackendConfig {
    /// Configuration rooted at `data_directory` with built-in defaults
    pub fn with_data_directory<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.as_ref().to_path_buf(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Resolve the data directory from the environment, then apply `config.yaml` if present
    pub fn load() -> Result<Self> {
        let data_directory = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => {
                info!("Using data directory from {}: {:?}", DATA_DIR_ENV, dir);
                PathBuf::from(dir)
            }
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIRECTORY_NAME))
                .context("Could not determine the platform data directory")?,
        };

        Self::load_from(data_directory)
    }

    /// Defaults for `data_directory`, overridden by its `config.yaml` when one exists
    pub fn load_from<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let mut config = Self::with_data_directory(data_directory);
        let config_path = config.data_directory.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            debug!("No {} found in {:?}, using defaults", CONFIG_FILE_NAME, config.data_directory);
            return Ok(config);
        }

        let yaml_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {:?}", config_path))?;
        let file_config: FileConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {:?}", config_path))?;

        if let Some(database_file) = file_config.database_file {
            config.database_file = database_file;
        }
        if let Some(log_filter) = file_config.log_filter {
            config.log_filter = log_filter;
        }

        info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_directory.join(&self.database_file)
    }
}
