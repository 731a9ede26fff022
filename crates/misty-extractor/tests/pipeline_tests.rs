//! Pipeline Integration Tests
//!
//! Run the extractor end to end over recorded tagger output.

use std::sync::Arc;

use misty_core::{EntityGroup, ExtractorConfig, TokenPrediction};
use misty_extractor::{
    EventExtractor, LexiconAnalyzer, MorphAnalyzer, ReplayTagger, Tagger, TextCleaner,
};
use proptest::prelude::*;

fn extractor_with(predictions: Vec<TokenPrediction>) -> EventExtractor {
    EventExtractor::new(
        Box::new(ReplayTagger::new(predictions)),
        Arc::new(LexiconAnalyzer::new()),
        ExtractorConfig::default(),
    )
}

/// Predictions for each whitespace-separated word of `text`
fn tag(text: &str, labels: &[(EntityGroup, f32)]) -> Vec<TokenPrediction> {
    let mut predictions = Vec::new();
    let mut offset = 0;
    for (word, (label, score)) in text.split(' ').zip(labels) {
        let len = word.chars().count();
        predictions.push(TokenPrediction::new(word, *label, *score, offset, offset + len));
        offset += len + 1;
    }
    predictions
}

// =============================================================================
// End-to-end extraction
// =============================================================================

#[test]
fn test_full_announcement() {
    let raw = "🎉 Большая дискотека «Ночь огней» 15 мая в 19 : 00 в парке Горького #танцы";
    let cleaned = "Большая дискотека \"Ночь огней\" 15 мая в 19 : 00 в парке Горького";

    let predictions = tag(
        cleaned,
        &[
            (EntityGroup::Event, 0.95),
            (EntityGroup::Event, 0.97),
            (EntityGroup::Name, 0.9),
            (EntityGroup::Name, 0.9),
            (EntityGroup::Date, 0.99),
            (EntityGroup::Date, 0.99),
            (EntityGroup::Outside, 0.99),
            (EntityGroup::Time, 0.96),
            (EntityGroup::Time, 0.96),
            (EntityGroup::Time, 0.96),
            (EntityGroup::Place, 0.93),
            (EntityGroup::Place, 0.93),
            (EntityGroup::Place, 0.93),
        ],
    );

    let extractor = extractor_with(vec![]);
    let extraction = extractor.extract(cleaned, raw, &predictions);

    assert_eq!(extraction.record.name, "Большой дискотека \"Ночь огней\"");
    assert_eq!(extraction.record.date, "15 мая");
    assert_eq!(extraction.record.time, "19:00");
    assert_eq!(extraction.record.place, "парк Горький");
    assert!(extraction.is_complete());
}

#[test]
fn test_predict_cleans_before_tagging() {
    struct EchoTagger;

    impl Tagger for EchoTagger {
        fn infer(&self, text: &str) -> misty_core::Result<Vec<TokenPrediction>> {
            // The tagger must never see emoji or links
            assert!(!text.contains("http"));
            assert!(!text.contains('🎉'));
            Ok(vec![TokenPrediction::new("концерт", EntityGroup::Event, 0.9, 0, 7)])
        }
    }

    let extractor = EventExtractor::new(
        Box::new(EchoTagger),
        Arc::new(LexiconAnalyzer::new()),
        ExtractorConfig::default(),
    );

    let extraction = extractor
        .predict("концерт 🎉 https://example.com")
        .unwrap();
    assert_eq!(extraction.record.name, "Концерт");
}

#[test]
fn test_custom_cleaner_is_used() {
    struct UpperCleaner;

    impl TextCleaner for UpperCleaner {
        fn clean(&self, raw: &str) -> String {
            raw.to_uppercase()
        }
    }

    struct CheckTagger;

    impl Tagger for CheckTagger {
        fn infer(&self, text: &str) -> misty_core::Result<Vec<TokenPrediction>> {
            assert_eq!(text, "ЛЕКЦИЯ");
            Ok(vec![TokenPrediction::new(text, EntityGroup::Subtitle, 0.8, 0, 6)])
        }
    }

    let extractor = EventExtractor::new(
        Box::new(CheckTagger),
        Arc::new(LexiconAnalyzer::new()),
        ExtractorConfig::default(),
    )
    .with_cleaner(Box::new(UpperCleaner));

    let extraction = extractor.predict("лекция").unwrap();
    assert_eq!(extraction.record.name, "Лекция");
}

#[test]
fn test_event_redundant_with_name_dropped() {
    let cleaned = "дискотека Большая дискотека";
    let predictions = vec![
        TokenPrediction::new("дискотека", EntityGroup::Event, 0.9, 0, 9),
        TokenPrediction::new("Большая", EntityGroup::Name, 0.9, 10, 17),
        TokenPrediction::new("дискотека", EntityGroup::Name, 0.9, 18, 27),
    ];

    let extractor = extractor_with(vec![]);
    let extraction = extractor.extract(cleaned, cleaned, &predictions);
    assert_eq!(extraction.record.name, "Большая дискотека");
}

#[test]
fn test_quoted_name_round_trip() {
    let raw = "Concert \"Winter Lights\" tonight";
    let predictions = vec![
        TokenPrediction::new("\"", EntityGroup::Name, 0.8, 8, 9),
        TokenPrediction::new("winter", EntityGroup::Name, 0.8, 9, 15),
    ];

    let extractor = extractor_with(vec![]);
    let bag = extractor.aggregate(&predictions, raw);
    assert_eq!(bag.get(EntityGroup::Name), ["\"Winter Lights\""]);

    let extraction = extractor.extract(raw, raw, &predictions);
    assert_eq!(extraction.record.name, "\"Winter Lights\"");
}

#[test]
fn test_proximity_boundaries() {
    let extractor = extractor_with(vec![]);

    // Gap of exactly one character merges
    let merged = extractor.aggregate(
        &[
            TokenPrediction::new("ДК", EntityGroup::Place, 0.9, 0, 2),
            TokenPrediction::new("Металлург", EntityGroup::Place, 0.9, 3, 12),
        ],
        "ДК Металлург",
    );
    assert_eq!(merged.get(EntityGroup::Place), ["ДК Металлург"]);

    // Gap of two characters splits
    let split = extractor.aggregate(
        &[
            TokenPrediction::new("ДК", EntityGroup::Place, 0.9, 0, 2),
            TokenPrediction::new("Металлург", EntityGroup::Place, 0.9, 4, 13),
        ],
        "ДК, Металлург",
    );
    assert_eq!(split.get(EntityGroup::Place), ["ДК", "Металлург"]);

    // Adjacent tokens with a different label split
    let relabeled = extractor.aggregate(
        &[
            TokenPrediction::new("ДК", EntityGroup::Place, 0.9, 0, 2),
            TokenPrediction::new("Металлург", EntityGroup::Name, 0.9, 3, 12),
        ],
        "ДК Металлург",
    );
    assert_eq!(relabeled.get(EntityGroup::Place), ["ДК"]);
    assert_eq!(relabeled.get(EntityGroup::Name), ["Металлург"]);
}

#[test]
fn test_shared_across_threads() {
    let extractor = Arc::new(extractor_with(vec![
        TokenPrediction::new("18", EntityGroup::Time, 0.9, 0, 2),
        TokenPrediction::new(".", EntityGroup::Time, 0.9, 3, 4),
        TokenPrediction::new("30", EntityGroup::Time, 0.9, 5, 7),
    ]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let extractor = Arc::clone(&extractor);
            std::thread::spawn(move || extractor.predict("18 . 30").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().record.time, "18:30");
    }
}

#[test]
fn test_analyzer_is_object_safe() {
    let analyzer: Arc<dyn MorphAnalyzer> = Arc::new(LexiconAnalyzer::new());
    assert_eq!(analyzer.lemmatize("концерта"), "концерт");
}

// =============================================================================
// Properties
// =============================================================================

fn group_strategy() -> impl Strategy<Value = EntityGroup> {
    prop::sample::select(EntityGroup::PHRASE_GROUPS.to_vec())
}

fn low_score_predictions() -> impl Strategy<Value = Vec<TokenPrediction>> {
    prop::collection::vec(
        ("[a-zа-я]{1,8}", group_strategy(), 0.0f32..=0.1f32, 0usize..200, 1usize..10),
        0..30,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(text, label, score, start, len)| {
                TokenPrediction::new(text, label, score, start, start + len)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_low_scores_yield_empty_bag(predictions in low_score_predictions()) {
        let extractor = extractor_with(vec![]);
        let bag = extractor.aggregate(&predictions, "");
        for group in EntityGroup::PHRASE_GROUPS {
            prop_assert!(bag.get(group).is_empty());
        }
    }

    #[test]
    fn prop_time_format_idempotent(hour in 0u32..24, minute in 0u32..60, sep in prop::sample::select(vec![" . ", ". ", " : ", " час "])) {
        let extractor = extractor_with(vec![]);
        let phrase = format!("{hour}{sep}{minute:02}");

        let bag = extractor.aggregate(
            &[TokenPrediction::new(phrase.clone(), EntityGroup::Time, 0.9, 0, phrase.chars().count())],
            &phrase,
        );
        let expected = format!("{hour}:{minute:02}");
        prop_assert_eq!(bag.get(EntityGroup::Time), [expected.clone()]);

        let again = extractor.aggregate(
            &[TokenPrediction::new(expected.clone(), EntityGroup::Time, 0.9, 0, expected.len())],
            &expected,
        );
        prop_assert_eq!(again.get(EntityGroup::Time), [expected]);
    }
}
