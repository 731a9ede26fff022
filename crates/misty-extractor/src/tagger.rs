//! Recorded tagger output
//!
//! The tagging model runs outside this crate. [`ReplayTagger`] serves a
//! prediction list recorded from it, e.g. the JSON emitted by a token
//! classification pipeline.

use std::path::Path;

use crate::Tagger;
use misty_core::{MistyError, Result, TokenPrediction};

/// Tagger that returns a fixed prediction list
#[derive(Debug, Clone, Default)]
pub struct ReplayTagger {
    predictions: Vec<TokenPrediction>,
}

impl ReplayTagger {
    pub fn new(predictions: Vec<TokenPrediction>) -> Self {
        Self { predictions }
    }

    /// Parse a JSON array of predictions
    pub fn from_json(json: &str) -> Result<Self> {
        let predictions: Vec<TokenPrediction> = serde_json::from_str(json)
            .map_err(|e| MistyError::Tagger(format!("invalid prediction JSON: {e}")))?;
        Ok(Self::new(predictions))
    }

    /// Read a JSON array of predictions from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

impl Tagger for ReplayTagger {
    fn infer(&self, _text: &str) -> Result<Vec<TokenPrediction>> {
        Ok(self.predictions.clone())
    }
}
