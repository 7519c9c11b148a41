use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::constants::{BASE_URL_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL, MODEL_ENV_VAR};
use crate::core::session::SessionSettings;

/// On-disk configuration. Every field is optional; unset fields fall back
/// to the environment and then to built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gemini model name (e.g., "gemini-2.5-flash")
    pub model: Option<String>,
    /// API base URL, without the `/models/...` suffix
    pub base_url: Option<String>,
    /// Whole-request timeout for the HTTP client, in seconds
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line; these win over everything else.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Config {
    /// Resolve session settings from, in decreasing priority: command-line
    /// overrides, environment variables, this config, built-in defaults.
    pub fn session_settings<F>(
        &self,
        overrides: &SettingsOverrides,
        api_key: Option<String>,
        env: F,
    ) -> SessionSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let model = non_blank(overrides.model.clone())
            .or_else(|| non_blank(env(MODEL_ENV_VAR)))
            .or_else(|| non_blank(self.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = non_blank(overrides.base_url.clone())
            .or_else(|| non_blank(env(BASE_URL_ENV_VAR)))
            .or_else(|| non_blank(self.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        SessionSettings {
            api_key,
            model: model.trim().to_string(),
            base_url: base_url.trim().to_string(),
            timeout: self
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), SettingError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SettingError::EmptyValue(key));
        }
        match key {
            ConfigKey::Model => self.model = Some(value.to_string()),
            ConfigKey::BaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(SettingError::InvalidUrl(value.to_string()));
                }
                self.base_url = Some(value.to_string());
            }
            ConfigKey::TimeoutSecs => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| SettingError::InvalidNumber(value.to_string()))?;
                self.timeout_secs = Some(secs);
            }
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Model => self.model = None,
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::TimeoutSecs => self.timeout_secs = None,
        }
    }
}

/// Keys accepted by `mediquery set` / `mediquery unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Model,
    BaseUrl,
    TimeoutSecs,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::Model, ConfigKey::BaseUrl, ConfigKey::TimeoutSecs];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Model => "model",
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::TimeoutSecs => "timeout-secs",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingError::UnknownKey(s.to_string()))
    }
}

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// A value was required but blank.
    EmptyValue(ConfigKey),
    /// The base URL is not an http(s) URL.
    InvalidUrl(String),
    /// The timeout is not a positive whole number.
    InvalidNumber(String),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                let known: Vec<_> = ConfigKey::ALL.iter().map(|key| key.as_str()).collect();
                write!(f, "Unknown config key: {key} (expected one of {})", known.join(", "))
            }
            SettingError::EmptyValue(key) => write!(f, "A value is required for {key}"),
            SettingError::InvalidUrl(value) => {
                write!(f, "Invalid base URL: {value} (must start with http:// or https://)")
            }
            SettingError::InvalidNumber(value) => {
                write!(f, "Invalid timeout: {value} (expected a positive number of seconds)")
            }
        }
    }
}

impl std::error::Error for SettingError {}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
