/*
 * Manages the application settings: where the catalog and the taxonomy document
 * live, how a bare year is turned into a time interval, and the default log
 * level. Settings are stored as `config.json` in the per-user local config
 * directory; a missing file simply yields the defaults.
 *
 * Access goes through `ConfigManagerOperations` so callers can be tested with an
 * alternative location or a mock.
 */
use crate::core::filter::YearIntervalMode;
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_CATALOG_FILENAME: &str = "raw_data_metadata.json";
pub const DEFAULT_TAXONOMY_FILENAME: &str = "taxonomy.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration file format error: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine the configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub taxonomy_path: PathBuf,
    pub year_interval: YearIntervalMode,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_FILENAME),
            taxonomy_path: PathBuf::from(DEFAULT_TAXONOMY_FILENAME),
            year_interval: YearIntervalMode::default(),
            log_level: "info".to_string(),
        }
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self, app_name: &str) -> Result<AppConfig>;
    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()>;
}

pub struct CoreConfigManager {
    config_dir_override: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            config_dir_override: None,
        }
    }

    /// Uses `dir` instead of the per-user config directory.
    pub fn with_config_dir(dir: PathBuf) -> Self {
        CoreConfigManager {
            config_dir_override: Some(dir),
        }
    }

    fn config_file_path(&self, app_name: &str) -> Result<PathBuf> {
        let dir = match &self.config_dir_override {
            Some(dir) => dir.clone(),
            None => path_utils::get_base_app_config_local_dir(app_name)
                .ok_or(ConfigError::NoProjectDirectory)?,
        };
        Ok(dir.join(CONFIG_FILENAME))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self, app_name: &str) -> Result<AppConfig> {
        log::trace!("CoreConfigManager: Loading configuration for app '{app_name}'");
        let file_path = self.config_file_path(app_name)?;

        if !file_path.exists() {
            log::debug!("CoreConfigManager: {file_path:?} does not exist, using defaults.");
            return Ok(AppConfig::default());
        }

        let file = File::open(&file_path)?;
        let config: AppConfig = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("CoreConfigManager: Loaded configuration from {file_path:?}.");
        Ok(config)
    }

    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()> {
        log::trace!("CoreConfigManager: Saving configuration for app '{app_name}'");
        let file_path = self.config_file_path(app_name)?;
        let file = File::create(&file_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), config)?;
        log::debug!("CoreConfigManager: Saved configuration to {file_path:?}.");
        Ok(())
    }
}
