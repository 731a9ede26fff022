//! Misty Extractor - Event record extraction pipeline
//!
//! Turns tagger output for an announcement text into an
//! [`EventRecord`](misty_core::EventRecord): token predictions are merged
//! into entity phrases, normalized, formatted, and the event title is
//! composed from the subtitle, event and name signals.

use misty_core::{Result, TokenPrediction};

pub mod aggregator;
pub mod cleaner;
pub mod composer;
pub mod formatter;
pub mod morph;
pub mod normalizer;
pub mod pipeline;
pub mod quoted;
pub mod tagger;

pub use aggregator::SpanAggregator;
pub use cleaner::RegexCleaner;
pub use composer::compose_title;
pub use formatter::Formatter;
pub use morph::{Analysis, LexiconAnalyzer, PartOfSpeech};
pub use normalizer::Normalizer;
pub use pipeline::EventExtractor;
pub use tagger::ReplayTagger;

/// Trait for raw text pre-cleaning
pub trait TextCleaner: Send + Sync {
    fn clean(&self, raw: &str) -> String;
}

/// Trait for token taggers
pub trait Tagger: Send + Sync {
    fn infer(&self, text: &str) -> Result<Vec<TokenPrediction>>;
}

/// Trait for part-of-speech and lemma analysis
pub trait MorphAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<Analysis>;

    /// Lemmas of every token, spaced as in the source text
    fn lemmatize(&self, text: &str) -> String {
        let tokens = self.analyze(text);
        morph::rejoin(tokens.iter().map(|a| (a.lemma.as_str(), a.whitespace)))
    }
}
