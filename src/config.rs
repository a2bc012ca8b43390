use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;

pub const DEFAULT_ENDPOINT_URL: &str =
    "https://mbo0gprxpg.execute-api.us-east-1.amazonaws.com/analyze";

const APP_DIR_NAME: &str = "image-label-uploader";
const MAX_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            request_timeout_secs: 120,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

pub fn get_config_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("config.json"))
}

pub fn load_config() -> AppResult<Config> {
    load_config_from(&get_config_path()?)
}

/// Parse config file contents. Missing fields take their defaults.
pub fn parse_config(contents: &str) -> AppResult<Config> {
    Ok(serde_json::from_str(contents)?)
}

/// Read the config at `path`, writing defaults there if the file is missing.
///
/// An unparseable file falls back to defaults with a warning, so the logger
/// must be installed before this is called.
pub fn load_config_from(path: &Path) -> AppResult<Config> {
    if path.exists() {
        let config_str = fs::read_to_string(path)?;
        let config = parse_config(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        });

        validate_config(&config)?;

        Ok(config)
    } else {
        let default_config = Config::default();
        save_config_to(path, &default_config)?;
        Ok(default_config)
    }
}

pub fn save_config(config: &Config) -> AppResult<()> {
    save_config_to(&get_config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &Config) -> AppResult<()> {
    validate_config(config)?;

    if path.exists() {
        let backup_path = path.with_extension("json.bak");
        if let Err(e) = fs::copy(path, &backup_path) {
            log::warn!("Failed to create config backup: {}", e);
        }
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str)?;

    log::info!("Configuration saved to {}", path.display());
    Ok(())
}

pub fn validate_config(config: &Config) -> AppResult<()> {
    InputValidator::validate_endpoint_url(&config.endpoint_url)?;

    if config.request_timeout_secs == 0 || config.request_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(AppError::validation(
            "request_timeout_secs",
            "Must be between 1 and 600",
        ));
    }

    let valid_log_levels = ["off", "error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(AppError::validation("log_level", "Must be a valid log level"));
    }

    Ok(())
}

pub fn reset_config() -> AppResult<Config> {
    reset_config_at(&get_config_path()?)
}

pub fn reset_config_at(path: &Path) -> AppResult<Config> {
    if path.exists() {
        let backup_path = path.with_extension("json.reset_backup");
        fs::copy(path, &backup_path)?;
        log::info!("Existing config backed up to {}", backup_path.display());
    }

    let default_config = Config::default();
    save_config_to(path, &default_config)?;

    log::info!("Configuration reset to defaults");
    Ok(default_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("image_label_uploader_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("config.json")
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.request_timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.endpoint_url = "mailto:someone@example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_off_log_level_is_valid() {
        let config = parse_config(r#"{ "log_level": "off" }"#).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.log_level_filter(), log::LevelFilter::Off);
    }

    #[test]
    fn test_load_creates_default_file() {
        let path = temp_config_path("load_default");

        let config = load_config_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_config_path("partial");
        fs::write(&path, r#"{ "endpoint_url": "http://localhost:9000/analyze" }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.endpoint_url, "http://localhost:9000/analyze");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let path = temp_config_path("garbage");
        fs::write(&path, "this is not json").unwrap();

        // The parse error is the reason reported in the fallback warning.
        match parse_config("this is not json") {
            Err(AppError::Json(e)) => assert!(!e.to_string().is_empty()),
            other => panic!("expected JSON error, got {:?}", other),
        }

        let config = load_config_from(&path).unwrap();
        assert_eq!(config, Config::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_backs_up_and_reset_restores_defaults() {
        let path = temp_config_path("save_reset");

        let mut config = Config::default();
        config.endpoint_url = "https://labels.example.com/analyze".to_string();
        save_config_to(&path, &Config::default()).unwrap();
        save_config_to(&path, &config).unwrap();
        assert!(path.with_extension("json.bak").exists());
        assert_eq!(load_config_from(&path).unwrap(), config);

        let reset = reset_config_at(&path).unwrap();
        assert_eq!(reset, Config::default());
        assert!(path.with_extension("json.reset_backup").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
