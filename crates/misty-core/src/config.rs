//! Misty Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults tuned for the bundled tagger.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction pipeline tuning
    pub extractor: ExtractorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("MISTY_SCORE_THRESHOLD") {
            config.extractor.score_threshold = parse_env("MISTY_SCORE_THRESHOLD", value)?;
        }
        if let Ok(value) = std::env::var("MISTY_PROXIMITY") {
            config.extractor.proximity = parse_env("MISTY_PROXIMITY", value)?;
        }
        if let Ok(path) = std::env::var("MISTY_LEXICON_PATH") {
            config.extractor.lexicon_path = Some(PathBuf::from(path));
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        config.extractor.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;

        config.extractor.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = ExtractorConfig::default();

        // Only override if env values differ from defaults
        if env_config.extractor.score_threshold != defaults.score_threshold {
            self.extractor.score_threshold = env_config.extractor.score_threshold;
        }
        if env_config.extractor.proximity != defaults.proximity {
            self.extractor.proximity = env_config.extractor.proximity;
        }
        if env_config.extractor.lexicon_path.is_some() {
            self.extractor.lexicon_path = env_config.extractor.lexicon_path;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }

        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Predictions at or below this score are discarded
    pub score_threshold: f32,

    /// A token continues the open phrase when `start < last_end + proximity`
    pub proximity: usize,

    /// Acronyms kept in their surface form (never lemmatized or re-cased)
    pub acronyms: Vec<String>,

    /// Event prefixes after which the rest of the phrase is copied verbatim
    pub idioms: Vec<String>,

    /// Fixed titles whose tokens are copied verbatim at the start of an event
    pub reserved_prefixes: Vec<String>,

    /// Optional user lexicon (TSV: form, lemma, POS) merged over the built-in one
    pub lexicon_path: Option<PathBuf>,
}

impl ExtractorConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "score_threshold".to_string(),
                value: self.score_threshold.to_string(),
            });
        }
        if self.proximity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "proximity".to_string(),
                value: self.proximity.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.1,
            proximity: 2,
            acronyms: ["ДК", "ТЦ", "ТРЦ", "КЦ", "МГУ", "МИФИ", "МЭИ", "ВДНХ", "IT", "DJ"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            idioms: vec!["Мастер класс".to_string()],
            reserved_prefixes: vec!["Что? Где? Когда?".to_string()],
            lexicon_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extractor.score_threshold, 0.1);
        assert_eq!(config.extractor.proximity, 2);
        assert!(config.extractor.acronyms.iter().any(|a| a == "ДК"));
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [extractor]
            score_threshold = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.extractor.score_threshold, 0.25);
        assert_eq!(config.extractor.proximity, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ExtractorConfig {
            score_threshold: 1.5,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ExtractorConfig {
            proximity: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/misty.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
