//! Event title composition
//!
//! Merges the subtitle, event and name signals into one title, dropping
//! pieces that repeat what another piece already says.

use std::collections::HashSet;

use crate::MorphAnalyzer;

/// Compose the event title
///
/// - the shortest event phrase wins (first on ties)
/// - a multi-word event or any name suppresses the subtitle
/// - an event contained in the name (case-insensitive), or whose lemma is
///   among the subtitle lemmas, is dropped
pub fn compose_title(
    subtitles: &[String],
    events: &[String],
    names: &[String],
    analyzer: &dyn MorphAnalyzer,
) -> String {
    let mut subtitle = subtitles.first().map(String::as_str).unwrap_or("");
    let name = names.first().map(String::as_str).unwrap_or("");
    let mut event = events
        .iter()
        .min_by_key(|e| e.split_whitespace().count())
        .map(String::as_str)
        .unwrap_or("");

    if event.split_whitespace().count() > 1 || !name.is_empty() {
        subtitle = "";
    }

    if !event.is_empty() {
        let in_name = name.to_lowercase().contains(&event.to_lowercase());
        let in_subtitle = !subtitle.is_empty() && {
            let lemmas: HashSet<String> = analyzer
                .analyze(subtitle)
                .into_iter()
                .map(|a| a.lemma.to_lowercase())
                .collect();
            lemmas.contains(&analyzer.lemmatize(event).to_lowercase())
        };

        if in_name || in_subtitle {
            tracing::debug!("Dropping redundant event {:?}", event);
            event = "";
        }
    }

    [subtitle, event, name]
        .iter()
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
