//! Morphological normalization of entity phrases
//!
//! Names keep their surface form, places are lemmatized with acronyms
//! protected, and event phrases go through a token walk that lemmatizes
//! the head of the phrase and stops at the first syntactic break.

use std::sync::Arc;

use crate::morph::{capitalize, rejoin, tokenize, Analysis, PartOfSpeech};
use crate::MorphAnalyzer;
use misty_core::{EntityGroup, ExtractorConfig};

/// Per-group phrase normalizer
#[derive(Clone)]
pub struct Normalizer {
    analyzer: Arc<dyn MorphAnalyzer>,
    acronyms: Vec<String>,
    /// Idioms in comparison form (see `idiom_key`)
    idioms: Vec<String>,
    /// Reserved prefixes as lowercase token sequences
    reserved_prefixes: Vec<Vec<String>>,
}

/// Mode flags for the event token walk
#[derive(Debug, Default)]
struct EventWalk {
    verbatim_from_here: bool,
    compound_armed: bool,
}

impl Normalizer {
    pub fn new(analyzer: Arc<dyn MorphAnalyzer>, config: &ExtractorConfig) -> Self {
        Self {
            analyzer,
            acronyms: config.acronyms.clone(),
            idioms: config.idioms.iter().map(String::as_str).map(idiom_key).collect(),
            reserved_prefixes: config
                .reserved_prefixes
                .iter()
                .map(|p| tokenize(p).into_iter().map(str::to_lowercase).collect())
                .filter(|tokens: &Vec<String>| !tokens.is_empty())
                .collect(),
        }
    }

    /// Rewrite a phrase into its canonical form for the group
    pub fn normalize(&self, phrase: &str, group: EntityGroup) -> String {
        match group {
            EntityGroup::Name => normalize_name(phrase),
            EntityGroup::Event => self.normalize_event(phrase),
            EntityGroup::Place => self.normalize_place(phrase),
            _ => phrase.to_string(),
        }
    }

    fn normalize_event(&self, phrase: &str) -> String {
        let tokens = self.analyzer.analyze(phrase);
        let reserved = self.reserved_prefix_len(&tokens);

        let mut walk = EventWalk::default();
        // Emitted pieces with the whitespace that followed them
        let mut out: Vec<(String, bool)> = Vec::with_capacity(tokens.len());
        let mut last_pos: Option<PartOfSpeech> = None;

        for (idx, token) in tokens.iter().enumerate() {
            if token.pos.is_connective() || self.is_idiom(&out) {
                walk.verbatim_from_here = true;
            }

            let piece = if token.pos == PartOfSpeech::Punct {
                if token.text == "-" {
                    walk.compound_armed = true;
                }
                token.text.clone()
            } else if idx < reserved {
                token.text.clone()
            } else if walk.compound_armed {
                walk.compound_armed = false;
                walk.verbatim_from_here = true;
                self.analyzer.lemmatize(&token.text)
            } else if walk.verbatim_from_here {
                token.text.clone()
            } else if idx == 0 {
                capitalize(&token.lemma)
            } else if idx == 1 && matches!(tokens[0].pos, PartOfSpeech::Adj | PartOfSpeech::Adv) {
                token.lemma.clone()
            } else if continues_head(tokens[idx - 1].pos, token.pos) {
                token.lemma.clone()
            } else {
                break;
            };

            out.push((piece, token.whitespace));
            last_pos = Some(token.pos);
        }

        if last_pos.is_some_and(|pos| pos.is_connective()) {
            out.pop();
        }

        rejoin(out.iter().map(|(piece, whitespace)| (piece.as_str(), *whitespace)))
    }

    /// Lemmatize token by token, keeping acronyms in their surface form
    fn normalize_place(&self, phrase: &str) -> String {
        let tokens = self.analyzer.analyze(phrase);
        let pieces = tokens.iter().map(|token| {
            let keep = self.acronyms.iter().any(|a| *a == token.text);
            let piece = if keep { &token.text } else { &token.lemma };
            (piece.as_str(), token.whitespace)
        });
        rejoin(pieces)
    }

    /// Number of leading tokens covered by a reserved prefix, 0 if none
    fn reserved_prefix_len(&self, tokens: &[Analysis]) -> usize {
        self.reserved_prefixes
            .iter()
            .find(|prefix| {
                prefix.len() <= tokens.len()
                    && prefix
                        .iter()
                        .zip(tokens)
                        .all(|(expected, token)| *expected == token.text.to_lowercase())
            })
            .map_or(0, Vec::len)
    }

    fn is_idiom(&self, built: &[(String, bool)]) -> bool {
        if built.is_empty() {
            return false;
        }
        let text: Vec<&str> = built.iter().map(|(piece, _)| piece.as_str()).collect();
        let key = idiom_key(&text.join(" "));
        self.idioms.iter().any(|idiom| *idiom == key)
    }
}

/// Previous/current tag pairs that keep extending the event head
fn continues_head(prev: PartOfSpeech, current: PartOfSpeech) -> bool {
    use PartOfSpeech::*;
    matches!(prev, Noun | Propn | Verb | Adj) && matches!(current, Noun | Propn | Adj)
}

/// Comparison form: lowercase, hyphens as spaces, single spacing
fn idiom_key(text: &str) -> String {
    text.to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first letter after an opening quote
fn normalize_name(phrase: &str) -> String {
    let Some(rest) = phrase.strip_prefix('"') else {
        return phrase.to_string();
    };
    if rest.is_empty() {
        return phrase.to_string();
    }

    let mut out = String::with_capacity(phrase.len());
    out.push('"');
    let mut done = false;
    for ch in rest.chars() {
        if done || ch.is_whitespace() {
            out.push(ch);
        } else {
            out.extend(ch.to_uppercase());
            done = true;
        }
    }
    out
}
