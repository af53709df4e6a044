use crate::errors::{NoorError, NoorResult};
use crate::types::{DEFAULT_API_BASE_URL, DEFAULT_MODEL_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "noor";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "NOOR_MODEL";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Optional overrides for the bundled prompt templates
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TemplatePaths {
    pub guidance: Option<PathBuf>,
    pub hadith_insights: Option<PathBuf>,
    pub personal_advice: Option<PathBuf>,
}

impl TemplatePaths {
    fn merge(&self, other: &Self) -> Self {
        Self {
            guidance: other.guidance.clone().or_else(|| self.guidance.clone()),
            hadith_insights: other
                .hadith_insights
                .clone()
                .or_else(|| self.hadith_insights.clone()),
            personal_advice: other
                .personal_advice
                .clone()
                .or_else(|| self.personal_advice.clone()),
        }
    }
}

/// Configuration shared by the server and the CLI
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NoorConfig {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub api_base_url: Option<String>,
    pub temperature: Option<f32>,
    pub request_timeout_secs: Option<u64>,
    /// Sliding window applied to the history sent upstream. `None` sends everything.
    pub max_history_turns: Option<usize>,
    #[serde(default)]
    pub templates: TemplatePaths,
}

impl Default for NoorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: Some(DEFAULT_MODEL_NAME.to_string()),
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            temperature: Some(DEFAULT_TEMPERATURE),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            max_history_turns: None,
            templates: TemplatePaths::default(),
        }
    }
}

impl NoorConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> NoorResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| NoorError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| NoorError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        // Fields absent from the file fall back to the defaults
        Ok(Self::default().merge(&config))
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> NoorResult<()> {
        let content = toml::to_string(self)
            .map_err(|e| NoorError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                NoorError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| NoorError::ConfigError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            api_base_url: other
                .api_base_url
                .clone()
                .or_else(|| self.api_base_url.clone()),
            temperature: other.temperature.or(self.temperature),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            max_history_turns: other.max_history_turns.or(self.max_history_turns),
            templates: self.templates.merge(&other.templates),
        }
    }

    /// Applies `GEMINI_API_KEY` and `NOOR_MODEL` from the process environment.
    /// A `.env` file in the working directory is honored.
    pub fn with_env_overrides(self) -> Self {
        let _ = dotenvy::dotenv();
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with an injectable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.model_name = Some(model);
        }
        self
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> NoorResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        NoorError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> NoorResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}

/// Loads `path` if given, otherwise the default config file, then applies the environment.
pub fn load_config(path: Option<&Path>) -> NoorResult<NoorConfig> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(NoorError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            NoorConfig::load_from_file(path)?
        }
        None => NoorConfig::load_from_file(&get_default_config_file(APP_NAME)?)?,
    };
    Ok(config.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = NoorConfig::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, NoorConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.max_history_turns, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_absent_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "model_name = \"gemini-1.5-pro\"\nmax_history_turns = 12\n\n[templates]\nguidance = \"/etc/noor/guidance.j2\"\n",
        )
        .unwrap();

        let config = NoorConfig::load_from_file(&path).unwrap();
        assert_eq!(config.model_name(), "gemini-1.5-pro");
        assert_eq!(config.max_history_turns, Some(12));
        assert_eq!(config.temperature(), 0.7);
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(
            config.templates.guidance,
            Some(PathBuf::from("/etc/noor/guidance.j2"))
        );
        assert_eq!(config.templates.hadith_insights, None);
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model_name = [").unwrap();

        let err = NoorConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, NoorError::ConfigError(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = NoorConfig {
            api_key: Some("secret".to_string()),
            request_timeout_secs: Some(5),
            ..Default::default()
        };

        config.save_to_file(&path).unwrap();
        assert_eq!(NoorConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = NoorConfig {
            api_key: Some("base".to_string()),
            max_history_turns: Some(10),
            ..Default::default()
        };
        let other = NoorConfig {
            api_key: None,
            model_name: Some("other-model".to_string()),
            api_base_url: None,
            temperature: None,
            request_timeout_secs: None,
            max_history_turns: Some(4),
            templates: TemplatePaths::default(),
        };

        let merged = base.merge(&other);
        assert_eq!(merged.api_key.as_deref(), Some("base"));
        assert_eq!(merged.model_name(), "other-model");
        assert_eq!(merged.max_history_turns, Some(4));
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let config = NoorConfig::default().with_overrides_from(|key| match key {
            API_KEY_ENV => Some("from-env".to_string()),
            MODEL_ENV => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.model_name(), DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = NoorConfig {
            api_base_url: Some("http://127.0.0.1:9000/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_base_url(), "http://127.0.0.1:9000");
    }
}
