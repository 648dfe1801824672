use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::weather::{ApiParam, DEFAULT_API_BASE};

pub const DEFAULT_CONFIG_PATH: &str = "sky-color.json";
pub const API_KEY_ENV: &str = "SKY_COLOR_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub location: LocationConfig,
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub output: OutputConfig,
    pub refresh: RefreshConfig,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            api_key: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            output: OutputConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl SkyConfig {
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("no {} found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("loaded {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Loads `path` and applies `SKY_COLOR_API_KEY` from the environment.
    pub fn load_with_env(path: &Path) -> Self {
        Self::load(path).with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// `None` until an API key is configured.
    pub fn api_param(&self) -> Option<ApiParam> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(ApiParam {
            api_key: api_key.to_string(),
            zip_code: self.location.zip_code.clone(),
            country_code: self.location.country_code.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub zip_code: String,
    pub country_code: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            zip_code: "1000000".to_string(),
            country_code: "JP".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub settings_path: PathBuf,
    pub section: String,
    pub background_key: String,
    pub foreground_key: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("settings.json"),
            section: "workbench.colorCustomizations".to_string(),
            background_key: "statusBar.background".to_string(),
            foreground_key: "statusBar.foreground".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub color_interval_secs: u64,
    pub weather_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            color_interval_secs: 60,
            weather_interval_secs: 30 * 60,
        }
    }
}

impl RefreshConfig {
    pub fn color_interval(&self) -> Duration {
        Duration::from_secs(self.color_interval_secs.max(1))
    }

    pub fn weather_interval(&self) -> Duration {
        Duration::from_secs(self.weather_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = SkyConfig::load(Path::new("/nonexistent/sky-color.json"));
        assert_eq!(config, SkyConfig::default());
        assert_eq!(config.location.zip_code, "1000000");
        assert_eq!(config.location.country_code, "JP");
        assert_eq!(config.refresh.color_interval(), Duration::from_secs(60));
        assert_eq!(config.refresh.weather_interval(), Duration::from_secs(1_800));
        assert_eq!(config.api_param(), None);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SkyConfig = serde_json::from_str(
            r#"{"api_key":"abc","location":{"zip_code":"94103"},"refresh":{"color_interval_secs":5}}"#,
        )
        .unwrap();
        assert_eq!(config.location.zip_code, "94103");
        assert_eq!(config.location.country_code, "JP");
        assert_eq!(config.refresh.color_interval_secs, 5);
        assert_eq!(config.refresh.weather_interval_secs, 1_800);
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(
            config.api_param(),
            Some(ApiParam {
                api_key: "abc".to_string(),
                zip_code: "94103".to_string(),
                country_code: "JP".to_string(),
            })
        );
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "sky-color-config-malformed-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        let config = SkyConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(config, SkyConfig::default());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let config = SkyConfig {
            api_key: Some("from-file".to_string()),
            ..SkyConfig::default()
        };
        let overridden = config.clone().with_api_key_override(Some("from-env".to_string()));
        assert_eq!(overridden.api_key.as_deref(), Some("from-env"));

        let kept = config.with_api_key_override(Some("   ".to_string()));
        assert_eq!(kept.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn blank_api_key_means_no_params() {
        let config = SkyConfig {
            api_key: Some("  ".to_string()),
            ..SkyConfig::default()
        };
        assert_eq!(config.api_param(), None);
    }

    #[test]
    fn zero_intervals_are_raised_to_one_second() {
        let refresh = RefreshConfig {
            color_interval_secs: 0,
            weather_interval_secs: 0,
        };
        assert_eq!(refresh.color_interval(), Duration::from_secs(1));
        assert_eq!(refresh.weather_interval(), Duration::from_secs(1));
    }
}
