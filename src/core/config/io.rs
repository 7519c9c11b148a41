use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug)]
pub enum ConfigLoadError {
    /// No platform configuration directory could be determined.
    NoConfigDir,

    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        /// Path to the configuration file with invalid TOML.
        path: PathBuf,
        /// The TOML deserialization error.
        source: toml::de::Error,
    },

    /// Failed to write the configuration file.
    Write {
        path: PathBuf,
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::NoConfigDir => {
                write!(f, "Failed to determine the configuration directory")
            }
            ConfigLoadError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path_display(path), source)
            }
            ConfigLoadError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path_display(path), source)
            }
            ConfigLoadError::Write { path, source } => {
                write!(f, "Failed to write config at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for ConfigLoadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigLoadError::NoConfigDir => None,
            ConfigLoadError::Read { source, .. } => Some(source),
            ConfigLoadError::Parse { source, .. } => Some(source),
            ConfigLoadError::Write { source, .. } => Some(source.as_ref()),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigLoadError> {
        Self::load_from_path(&Self::get_config_path()?)
    }

    pub fn save(&self) -> Result<(), ConfigLoadError> {
        self.save_to_path(&Self::get_config_path()?)
    }

    /// A missing file is not an error: it yields the default configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigLoadError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigLoadError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Write through a temporary file in the same directory and rename it
    /// into place, so readers never observe a half-written config.
    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigLoadError> {
        let write_error = |source: Box<dyn StdError + Send + Sync>| ConfigLoadError::Write {
            path: config_path.to_path_buf(),
            source,
        };

        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|err| write_error(err.into()))?;
        }

        let contents = toml::to_string_pretty(self).map_err(|err| write_error(err.into()))?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|err| write_error(err.into()))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|err| write_error(err.into()))?;
        temp_file
            .as_file_mut()
            .sync_all()
            .map_err(|err| write_error(err.into()))?;
        temp_file
            .persist(config_path)
            .map_err(|err| write_error(err.into()))?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigLoadError> {
        let proj_dirs =
            ProjectDirs::from("org", "mediquery", "mediquery").ok_or(ConfigLoadError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
