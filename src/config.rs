//! Application configuration
//!
//! Defaults, overridden by an optional JSON file, overridden by environment
//! variables for API keys and model names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const LLM_MODEL_ENV: &str = "PRACTICE_ROOM_LLM_MODEL";
pub const TRANSCRIPTION_MODEL_ENV: &str = "PRACTICE_ROOM_TRANSCRIPTION_MODEL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("student interval range is inverted: min {min}s > max {max}s")]
    InvertedStudentInterval { min: u64, max: u64 },
}

/// Hosted speech-to-text settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Hosted generative-text settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Producer timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub face_interval_ms: u64,
    pub chunk_duration_secs: u64,
    pub settle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            face_interval_ms: 200,
            chunk_duration_secs: 10,
            settle_delay_ms: 100,
        }
    }
}

impl SessionConfig {
    pub fn face_interval(&self) -> Duration {
        Duration::from_millis(self.face_interval_ms)
    }

    pub fn chunk_duration(&self) -> Duration {
        Duration::from_secs(self.chunk_duration_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Simulated student pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentConfig {
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    pub max_messages: usize,
}

impl Default for StudentConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 20,
            max_interval_secs: 45,
            max_messages: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub transcription: TranscriptionConfig,
    pub llm: LlmConfig,
    pub session: SessionConfig,
    pub students: StudentConfig,
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("practice-room")
            .join("config.json")
    }

    /// Load from a JSON file (missing file = defaults), then apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<AppConfig>(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            log::info!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(OPENAI_API_KEY_ENV) {
            self.transcription.api_key = Some(key);
        }
        if let Some(key) = lookup(GEMINI_API_KEY_ENV) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup(LLM_MODEL_ENV) {
            self.llm.model = model;
        }
        if let Some(model) = lookup(TRANSCRIPTION_MODEL_ENV) {
            self.transcription.model = model;
        }
    }

    /// Blank API keys count as absent
    pub fn normalize(&mut self) {
        for key in [&mut self.transcription.api_key, &mut self.llm.api_key] {
            if key.as_deref().map(str::trim).map_or(false, str::is_empty) {
                *key = None;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.face_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("session.faceIntervalMs"));
        }
        if self.session.chunk_duration_secs == 0 {
            return Err(ConfigError::ZeroInterval("session.chunkDurationSecs"));
        }
        if self.students.max_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("students.maxIntervalSecs"));
        }
        if self.students.min_interval_secs > self.students.max_interval_secs {
            return Err(ConfigError::InvertedStudentInterval {
                min: self.students.min_interval_secs,
                max: self.students.max_interval_secs,
            });
        }
        Ok(())
    }

    /// Remote content scoring is used exactly when a generative-text key is set
    pub fn remote_content_enabled(&self) -> bool {
        self.llm.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.session.face_interval(), Duration::from_millis(200));
        assert_eq!(config.session.chunk_duration(), Duration::from_secs(10));
        assert_eq!(config.transcription.model, "whisper-1");
        assert!(!config.remote_content_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_and_blank_keys() {
        let vars: HashMap<&str, &str> = [
            (GEMINI_API_KEY_ENV, "g-key"),
            (OPENAI_API_KEY_ENV, "   "),
            (LLM_MODEL_ENV, "gemini-pro"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        config.normalize();

        assert_eq!(config.llm.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.llm.model, "gemini-pro");
        assert_eq!(config.transcription.api_key, None);
        assert!(config.remote_content_enabled());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"session": {"chunkDurationSecs": 5}, "llm": {"apiKey": "  "}}"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.session.chunk_duration_secs, 5);
        assert_eq!(config.session.face_interval_ms, 200);
        assert_eq!(config.students, StudentConfig::default());
        if std::env::var(GEMINI_API_KEY_ENV).is_err() {
            assert_eq!(config.llm.api_key, None);
        }
    }

    #[test]
    fn test_invalid_file_fails_validation_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"students": {"minIntervalSecs": 90}}"#).unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("90"), "{}", err);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.students.min_interval_secs = 60;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedStudentInterval { min: 60, max: 45 })
        );

        let mut config = AppConfig::default();
        config.session.face_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval(_))));
    }
}
