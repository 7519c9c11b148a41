pub mod data;
pub mod io;
pub mod printing;

pub use data::{Config, ConfigKey, SettingError, SettingsOverrides};
pub use io::ConfigLoadError;

#[cfg(test)]
pub mod tests;
