use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Model identifier used when none is configured.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Persisted configuration. Every field is optional here; the controllers
/// receive validated settings structs instead of reading this (or the
/// environment) directly.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub completion_api_key: Option<String>,
    pub completion_model: Option<String>,
    pub upload_cloud_name: Option<String>,
    pub upload_preset: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config file values, overridden by environment variables.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.completion_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("LIENZO_MODEL") {
            self.completion_model = Some(model);
        }
        if let Ok(cloud) = std::env::var("CLOUDINARY_CLOUD_NAME") {
            self.upload_cloud_name = Some(cloud);
        }
        if let Ok(preset) = std::env::var("CLOUDINARY_UPLOAD_PRESET") {
            self.upload_preset = Some(preset);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("lienzo").join("config.json"))
    }

    /// Everything the chat controller needs, or an error naming the missing
    /// value.
    pub fn chat_settings(&self) -> Result<ChatSettings> {
        let api_key = self.completion_api_key.clone().ok_or_else(|| {
            anyhow!("completion API key not configured; set OPENAI_API_KEY or completion_api_key in config.json")
        })?;
        let model = self
            .completion_model
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string());
        Ok(ChatSettings { api_key, model })
    }

    /// Everything the media controller needs, or an error naming the missing
    /// value.
    pub fn upload_settings(&self) -> Result<UploadSettings> {
        let cloud_name = self.upload_cloud_name.clone().ok_or_else(|| {
            anyhow!("upload cloud name not configured; set CLOUDINARY_CLOUD_NAME or upload_cloud_name in config.json")
        })?;
        let upload_preset = self.upload_preset.clone().ok_or_else(|| {
            anyhow!("upload preset not configured; set CLOUDINARY_UPLOAD_PRESET or upload_preset in config.json")
        })?;
        Ok(UploadSettings {
            cloud_name,
            upload_preset,
        })
    }
}

/// Validated settings for the chat controller.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub api_key: String,
    pub model: String,
}

/// Validated settings for the media controller.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub cloud_name: String,
    pub upload_preset: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_settings_require_api_key() {
        let config = Config::new();
        let err = config.chat_settings().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_chat_settings_fall_back_to_default_model() {
        let config = Config {
            completion_api_key: Some("sk-test".to_string()),
            ..Config::new()
        };
        let settings = config.chat_settings().unwrap();
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.model, DEFAULT_COMPLETION_MODEL);
    }

    #[test]
    fn test_upload_settings_require_both_values() {
        let config = Config {
            upload_cloud_name: Some("demo".to_string()),
            ..Config::new()
        };
        let err = config.upload_settings().unwrap_err();
        assert!(err.to_string().contains("CLOUDINARY_UPLOAD_PRESET"));

        let config = Config {
            upload_cloud_name: Some("demo".to_string()),
            upload_preset: Some("unsigned".to_string()),
            ..Config::new()
        };
        let settings = config.upload_settings().unwrap();
        assert_eq!(settings.cloud_name, "demo");
        assert_eq!(settings.upload_preset, "unsigned");
    }
}
