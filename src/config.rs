use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::reading_list::DEFAULT_CAPACITY;
use crate::storage::DEFAULT_FILE_PATH;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_file_path")]
    pub file_path: String,

    #[serde(default = "default_capacity")]
    pub default_capacity: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserConfig {
    /// Program used to open links; `$BROWSER` or the platform opener otherwise.
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.as_ref().display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given (it must exist), else the default location
    /// if present, else built-in defaults. Environment overrides apply last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::config_file() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => {
                    debug!("No configuration file, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.file_path.trim().is_empty() {
            return Err(Error::Config("File path cannot be empty".to_string()));
        }

        if self.storage.default_capacity == 0 {
            return Err(Error::Config(
                "Default capacity must be greater than 0".to_string(),
            ));
        }

        if matches!(&self.browser.command, Some(cmd) if cmd.trim().is_empty()) {
            return Err(Error::Config("Browser command cannot be empty".to_string()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BEJW_FILE_PATH") {
            self.storage.file_path = path;
        }

        if let Some(capacity) = lookup("BEJW_CAPACITY") {
            self.storage.default_capacity = match capacity.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(Error::Config("BEJW_CAPACITY must be at least 1".to_string()))
                }
                Ok(value) => value,
                Err(_) => {
                    return Err(Error::Config(format!(
                        "BEJW_CAPACITY is not a number: {}",
                        capacity
                    )))
                }
            };
        }

        if let Some(browser) = lookup("BEJW_BROWSER") {
            self.browser.command = Some(browser);
        }

        if let Some(level) = lookup("BEJW_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bejw"))
    }

    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            default_capacity: default_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

fn default_file_path() -> String { DEFAULT_FILE_PATH.to_string() }
fn default_capacity() -> usize { DEFAULT_CAPACITY }
fn default_log_level() -> String { "warn".to_string() }
