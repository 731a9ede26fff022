//! Span aggregation module
//!
//! Merges adjacent token predictions that share a label into entity
//! phrases and formats each closed phrase into the [`EntityBag`].

use crate::formatter::Formatter;
use crate::quoted::recover_quoted;
use misty_core::{EntityBag, EntityGroup, EntityPhrase, ExtractorConfig, TokenPrediction};

/// Groups token predictions into formatted entity phrases
pub struct SpanAggregator<'a> {
    formatter: &'a Formatter,
    /// Predictions at or below this score are ignored
    score_threshold: f32,
    /// Continuation requires `start < last_end + proximity`
    proximity: usize,
}

impl<'a> SpanAggregator<'a> {
    pub fn new(formatter: &'a Formatter, config: &ExtractorConfig) -> Self {
        Self {
            formatter,
            score_threshold: config.score_threshold,
            proximity: config.proximity,
        }
    }

    /// Aggregate the predictions for one text
    ///
    /// `raw` is the uncleaned source, used to recover quoted names.
    pub fn aggregate(&self, predictions: &[TokenPrediction], raw: &str) -> EntityBag {
        let mut bag = EntityBag::new();
        let mut current: Option<EntityPhrase> = None;

        let accepted = predictions
            .iter()
            .filter(|p| p.score > self.score_threshold && p.label != EntityGroup::Outside);

        for prediction in accepted {
            match current.as_mut() {
                Some(phrase) if self.continues(phrase, prediction) => phrase.push(prediction),
                _ => {
                    if let Some(closed) = current.replace(EntityPhrase::start(prediction)) {
                        self.flush(closed, raw, &mut bag);
                    }
                }
            }
        }

        if let Some(phrase) = current {
            self.flush(phrase, raw, &mut bag);
        }

        bag
    }

    fn continues(&self, phrase: &EntityPhrase, prediction: &TokenPrediction) -> bool {
        phrase.group == prediction.label
            && prediction.start < phrase.end_offset.saturating_add(self.proximity)
    }

    /// Format a closed phrase and append it to the bag
    ///
    /// A failing phrase is logged and skipped; the rest of the text is
    /// still processed.
    fn flush(&self, phrase: EntityPhrase, raw: &str, bag: &mut EntityBag) {
        let text = phrase.text();
        let formatted = match self.formatter.format(&text, phrase.group) {
            Ok(formatted) => formatted,
            Err(e) => {
                tracing::warn!("Skipping {} phrase {:?}: {}", phrase.group, text, e);
                return;
            }
        };

        tracing::debug!("{} phrase {:?} -> {:?}", phrase.group, text, formatted);

        let quoted_name = phrase.group == EntityGroup::Name
            && phrase
                .first_word()
                .is_some_and(|word| word.trim_start().starts_with('"'));
        if quoted_name {
            for name in recover_quoted(&formatted, raw) {
                bag.push(EntityGroup::Name, name);
            }
        } else if !formatted.is_empty() {
            bag.push(phrase.group, formatted);
        }
    }
}
