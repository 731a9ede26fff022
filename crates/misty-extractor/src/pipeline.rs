//! Event extraction pipeline
//!
//! Wires the cleaner, tagger and post-processing stages together and
//! builds the final [`EventRecord`].

use std::sync::Arc;

use crate::aggregator::SpanAggregator;
use crate::cleaner::RegexCleaner;
use crate::composer::compose_title;
use crate::formatter::Formatter;
use crate::morph::LexiconAnalyzer;
use crate::normalizer::Normalizer;
use crate::{MorphAnalyzer, Tagger, TextCleaner};
use misty_core::{
    EntityBag, EntityGroup, EventRecord, ExtractorConfig, Extraction, MistyError, Result,
    TokenPrediction,
};

/// Groups that must be present for a complete record
const REQUIRED_GROUPS: [EntityGroup; 2] = [EntityGroup::Date, EntityGroup::Time];

/// End-to-end extractor for one announcement at a time
///
/// Holds only read-only state and can be shared across threads.
pub struct EventExtractor {
    cleaner: Box<dyn TextCleaner>,
    tagger: Box<dyn Tagger>,
    analyzer: Arc<dyn MorphAnalyzer>,
    formatter: Formatter,
    config: ExtractorConfig,
}

impl EventExtractor {
    /// Create an extractor with the regex cleaner
    pub fn new(
        tagger: Box<dyn Tagger>,
        analyzer: Arc<dyn MorphAnalyzer>,
        config: ExtractorConfig,
    ) -> Self {
        let normalizer = Normalizer::new(Arc::clone(&analyzer), &config);
        let formatter = Formatter::new(normalizer, config.acronyms.clone());

        Self {
            cleaner: Box::new(RegexCleaner::new()),
            tagger,
            analyzer,
            formatter,
            config,
        }
    }

    /// Create an extractor with the bundled lexicon, merging the
    /// configured lexicon file if any
    pub fn from_config(tagger: Box<dyn Tagger>, config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let mut analyzer = LexiconAnalyzer::new();
        if let Some(path) = &config.lexicon_path {
            analyzer = analyzer.with_file(path)?;
        }
        Ok(Self::new(tagger, Arc::new(analyzer), config))
    }

    /// Replace the text cleaner
    pub fn with_cleaner(mut self, cleaner: Box<dyn TextCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Clean, tag and extract an event record from raw announcement text
    pub fn predict(&self, raw: &str) -> Result<Extraction> {
        if raw.trim().is_empty() {
            return Err(MistyError::EmptyText);
        }

        let cleaned = self.cleaner.clean(raw);
        let predictions = self.tagger.infer(&cleaned)?;
        tracing::debug!("Tagger returned {} predictions", predictions.len());

        Ok(self.extract(&cleaned, raw, &predictions))
    }

    /// Build the record from tagger output for already cleaned text
    pub fn extract(&self, cleaned: &str, raw: &str, predictions: &[TokenPrediction]) -> Extraction {
        let bag = self.aggregate(predictions, raw);
        tracing::debug!(
            "Aggregated {} phrases from {} characters",
            bag.len(),
            cleaned.chars().count()
        );
        self.compose(&bag)
    }

    /// Aggregate predictions into formatted phrases
    pub fn aggregate(&self, predictions: &[TokenPrediction], raw: &str) -> EntityBag {
        SpanAggregator::new(&self.formatter, &self.config).aggregate(predictions, raw)
    }

    /// Turn an entity bag into the final record
    pub fn compose(&self, bag: &EntityBag) -> Extraction {
        let name = compose_title(
            bag.get(EntityGroup::Subtitle),
            bag.get(EntityGroup::Event),
            bag.get(EntityGroup::Name),
            self.analyzer.as_ref(),
        );

        let missing: Vec<EntityGroup> = REQUIRED_GROUPS
            .into_iter()
            .filter(|group| bag.first(*group).is_none())
            .collect();
        for group in &missing {
            tracing::warn!("No {} entity found in text", group);
        }

        let field = |group: EntityGroup| bag.first(group).unwrap_or_default().to_string();

        Extraction {
            record: EventRecord {
                name,
                date: field(EntityGroup::Date),
                time: field(EntityGroup::Time),
                place: field(EntityGroup::Place),
            },
            missing,
        }
    }
}
