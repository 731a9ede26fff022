//! Misty Core - Domain models, errors and shared configuration
//!
//! This crate defines the types that flow through the Misty event
//! extraction pipeline:
//! - Tagger output (`TokenPrediction`) and entity groups
//! - Aggregated phrases and the per-run `EntityBag`
//! - The final `EventRecord` and its `Extraction` envelope
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, ExtractorConfig, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Misty operations
#[derive(Error, Debug)]
pub enum MistyError {
    #[error("Unsupported entity group for formatting: {0}")]
    UnsupportedGroup(EntityGroup),

    #[error("Unknown entity label: {0}")]
    UnknownLabel(String),

    #[error("Empty text")]
    EmptyText,

    #[error("Tagger error: {0}")]
    Tagger(String),

    #[error("Lexicon error at line {line}: {message}")]
    Lexicon { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for MistyError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MistyError>;

// ============================================================================
// Entity Groups
// ============================================================================

/// Semantic category a tagged token belongs to
///
/// `Outside` is the tagger's `O` tag. It is dropped before aggregation,
/// so only the six named groups ever reach normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityGroup {
    Event,
    Name,
    Date,
    Time,
    Place,
    Subtitle,
    Outside,
}

impl EntityGroup {
    /// All groups that can carry a phrase
    pub const PHRASE_GROUPS: [EntityGroup; 6] = [
        Self::Event,
        Self::Name,
        Self::Date,
        Self::Time,
        Self::Place,
        Self::Subtitle,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Name => "name",
            Self::Date => "date",
            Self::Time => "time",
            Self::Place => "place",
            Self::Subtitle => "subtitle",
            Self::Outside => "O",
        }
    }
}

impl std::fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityGroup {
    type Err = MistyError;

    /// Parses tagger labels, accepting IOB prefixes (`B-EVENT`, `I-place`)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix("B-")
            .or_else(|| trimmed.strip_prefix("I-"))
            .unwrap_or(trimmed);

        match bare.to_lowercase().as_str() {
            "event" => Ok(Self::Event),
            "name" => Ok(Self::Name),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "place" => Ok(Self::Place),
            "subtitle" => Ok(Self::Subtitle),
            "o" => Ok(Self::Outside),
            _ => Err(MistyError::UnknownLabel(s.to_string())),
        }
    }
}

impl TryFrom<String> for EntityGroup {
    type Error = MistyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EntityGroup> for String {
    fn from(group: EntityGroup) -> Self {
        group.as_str().to_string()
    }
}

// ============================================================================
// Tagger Output
// ============================================================================

/// A single labeled token produced by the tagger
///
/// `start` and `end` are character offsets into the cleaned text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrediction {
    /// Surface text of the token
    #[serde(alias = "word")]
    pub text: String,

    /// Entity group assigned by the tagger
    #[serde(rename = "entity_group", alias = "label", alias = "entity")]
    pub label: EntityGroup,

    /// Confidence in [0, 1]
    pub score: f32,

    /// Start offset (inclusive)
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,
}

impl TokenPrediction {
    pub fn new(
        text: impl Into<String>,
        label: EntityGroup,
        score: f32,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            text: text.into(),
            label,
            score,
            start,
            end,
        }
    }
}

// ============================================================================
// Aggregation Models
// ============================================================================

/// A run of tokens merged under one entity group
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPhrase {
    pub group: EntityGroup,
    pub words: Vec<String>,
    pub end_offset: usize,
}

impl EntityPhrase {
    /// Open a phrase from its first token
    pub fn start(prediction: &TokenPrediction) -> Self {
        Self {
            group: prediction.label,
            words: vec![prediction.text.clone()],
            end_offset: prediction.end,
        }
    }

    /// Append a continuation token
    pub fn push(&mut self, prediction: &TokenPrediction) {
        self.words.push(prediction.text.clone());
        self.end_offset = prediction.end;
    }

    /// First raw word of the phrase
    pub fn first_word(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Words joined by single spaces
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// Formatted phrases per group, accumulated over one text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityBag {
    phrases: HashMap<EntityGroup, Vec<String>>,
}

impl EntityBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a formatted phrase to a group
    pub fn push(&mut self, group: EntityGroup, phrase: impl Into<String>) {
        self.phrases.entry(group).or_default().push(phrase.into());
    }

    /// All phrases of a group, in extraction order
    pub fn get(&self, group: EntityGroup) -> &[String] {
        self.phrases.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First phrase of a group, if any
    pub fn first(&self, group: EntityGroup) -> Option<&str> {
        self.get(group).first().map(String::as_str)
    }

    /// True when no group holds a phrase
    pub fn is_empty(&self) -> bool {
        self.phrases.values().all(Vec::is_empty)
    }

    /// Total number of phrases across groups
    pub fn len(&self) -> usize {
        self.phrases.values().map(Vec::len).sum()
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// Final structured event record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub date: String,
    pub time: String,
    pub place: String,
}

/// Event record plus the required groups that were not found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub record: EventRecord,

    /// Required groups (`date`, `time`) with no phrase in the input
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<EntityGroup>,
}

impl Extraction {
    /// True when every required field was found
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_group_parse() {
        assert_eq!("EVENT".parse::<EntityGroup>().unwrap(), EntityGroup::Event);
        assert_eq!("B-place".parse::<EntityGroup>().unwrap(), EntityGroup::Place);
        assert_eq!("I-TIME".parse::<EntityGroup>().unwrap(), EntityGroup::Time);
        assert_eq!("O".parse::<EntityGroup>().unwrap(), EntityGroup::Outside);
        assert!("venue".parse::<EntityGroup>().is_err());
    }

    #[test]
    fn test_entity_group_display() {
        assert_eq!(EntityGroup::Subtitle.to_string(), "subtitle");
        assert_eq!(EntityGroup::Outside.to_string(), "O");
    }

    #[test]
    fn test_config_error_converts() {
        let err: MistyError = ConfigError::InvalidValue {
            key: "proximity".to_string(),
            value: "0".to_string(),
        }
        .into();
        assert!(matches!(err, MistyError::Config(_)));
        assert!(err.to_string().contains("proximity"));
    }

    #[test]
    fn test_token_prediction_from_json() {
        let json = r#"{"word": "концерт", "entity_group": "EVENT", "score": 0.93, "start": 0, "end": 7}"#;
        let prediction: TokenPrediction = serde_json::from_str(json).unwrap();

        assert_eq!(prediction.text, "концерт");
        assert_eq!(prediction.label, EntityGroup::Event);
        assert_eq!(prediction.end, 7);
    }

    #[test]
    fn test_token_prediction_rejects_unknown_label() {
        let json = r#"{"text": "x", "label": "VENUE", "score": 0.5, "start": 0, "end": 1}"#;
        assert!(serde_json::from_str::<TokenPrediction>(json).is_err());
    }

    #[test]
    fn test_entity_bag() {
        let mut bag = EntityBag::new();
        assert!(bag.is_empty());

        bag.push(EntityGroup::Date, "15 мая");
        bag.push(EntityGroup::Date, "16 мая");

        assert_eq!(bag.first(EntityGroup::Date), Some("15 мая"));
        assert_eq!(bag.get(EntityGroup::Date).len(), 2);
        assert!(bag.get(EntityGroup::Time).is_empty());
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_entity_phrase_push() {
        let first = TokenPrediction::new("парк", EntityGroup::Place, 0.9, 2, 6);
        let second = TokenPrediction::new("Горького", EntityGroup::Place, 0.9, 7, 15);

        let mut phrase = EntityPhrase::start(&first);
        phrase.push(&second);

        assert_eq!(phrase.text(), "парк Горького");
        assert_eq!(phrase.end_offset, 15);
        assert_eq!(phrase.first_word(), Some("парк"));
    }
}
