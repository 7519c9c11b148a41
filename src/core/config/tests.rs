use super::data::{Config, ConfigKey, SettingError, SettingsOverrides};
use super::io::ConfigLoadError;
use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::session::SessionSettings;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set(ConfigKey::Model, "gemini-2.5-pro").unwrap();
    config.set(ConfigKey::TimeoutSecs, "45").unwrap();
    config.save_to_path(&config_path).expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.model.as_deref(), Some("gemini-2.5-pro"));
    assert_eq!(loaded.timeout_secs, Some(45));
    assert_eq!(loaded.base_url, None);

    let mut loaded = loaded;
    loaded.unset(ConfigKey::Model);
    loaded.save_to_path(&config_path).expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.model, None);
    assert_eq!(reloaded.timeout_secs, Some(45));
}

#[test]
fn invalid_toml_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "model = [unterminated").expect("write");

    match Config::load_from_path(&config_path) {
        Err(ConfigLoadError::Parse { path, .. }) => assert_eq!(path, config_path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn settings_default_when_nothing_is_configured() {
    let settings =
        Config::default().session_settings(&SettingsOverrides::default(), None, env_from(&[]));
    assert_eq!(settings.model, DEFAULT_MODEL);
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.timeout, None);
    assert_eq!(settings.api_key, None);
}

#[test]
fn settings_precedence_is_flag_then_env_then_file() {
    let config = Config {
        model: Some("from-file".to_string()),
        base_url: Some("https://file.example".to_string()),
        timeout_secs: Some(30),
    };
    let env = env_from(&[("MEDIQUERY_MODEL", "from-env")]);
    let overrides = SettingsOverrides {
        model: None,
        base_url: Some("http://127.0.0.1:8080".to_string()),
    };

    let settings: SessionSettings =
        config.session_settings(&overrides, Some("key".to_string()), env);
    assert_eq!(settings.model, "from-env");
    assert_eq!(settings.base_url, "http://127.0.0.1:8080");
    assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
    assert_eq!(settings.api_key.as_deref(), Some("key"));

    let overrides = SettingsOverrides {
        model: Some("from-flag".to_string()),
        base_url: None,
    };
    let settings = config.session_settings(&overrides, None, env_from(&[("MEDIQUERY_MODEL", "from-env")]));
    assert_eq!(settings.model, "from-flag");
    assert_eq!(settings.base_url, "https://file.example");
}

#[test]
fn blank_values_do_not_override() {
    let config = Config {
        model: Some("from-file".to_string()),
        ..Default::default()
    };
    let overrides = SettingsOverrides {
        model: Some("  ".to_string()),
        base_url: None,
    };
    let settings = config.session_settings(&overrides, None, env_from(&[("MEDIQUERY_MODEL", "")]));
    assert_eq!(settings.model, "from-file");
}

#[test]
fn set_validates_values() {
    let mut config = Config::default();
    assert_eq!(
        config.set(ConfigKey::BaseUrl, "ftp://nope"),
        Err(SettingError::InvalidUrl("ftp://nope".to_string()))
    );
    assert_eq!(
        config.set(ConfigKey::TimeoutSecs, "0"),
        Err(SettingError::InvalidNumber("0".to_string()))
    );
    assert_eq!(
        config.set(ConfigKey::Model, "   "),
        Err(SettingError::EmptyValue(ConfigKey::Model))
    );
    assert_eq!(config, Config::default());
}

#[test]
fn config_keys_parse_from_cli_names() {
    assert_eq!("model".parse::<ConfigKey>(), Ok(ConfigKey::Model));
    assert_eq!("base-url".parse::<ConfigKey>(), Ok(ConfigKey::BaseUrl));
    assert_eq!("timeout-secs".parse::<ConfigKey>(), Ok(ConfigKey::TimeoutSecs));
    assert!(matches!(
        "theme".parse::<ConfigKey>(),
        Err(SettingError::UnknownKey(_))
    ));
}

#[test]
fn render_all_reports_effective_values() {
    let config = Config {
        model: Some("stored-model".to_string()),
        ..Default::default()
    };
    let effective = SessionSettings {
        api_key: None,
        model: "effective-model".to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        timeout: None,
    };
    let rendered = config.render_all(&effective);
    assert!(rendered.contains("model: stored-model (effective: effective-model)"));
    assert!(rendered.contains("base-url: (unset)"));
    assert!(rendered.contains("api key: missing"));
}
