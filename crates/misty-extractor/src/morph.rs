//! Morphological analysis module
//!
//! Splits phrases into tokens and assigns each a universal part-of-speech
//! tag and a lemma. The pipeline depends only on the [`MorphAnalyzer`]
//! trait; [`LexiconAnalyzer`] is the bundled dictionary-backed
//! implementation for Russian.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::MorphAnalyzer;
use misty_core::{MistyError, Result};

// ============================================================================
// Part of Speech
// ============================================================================

/// Universal Dependencies part-of-speech tags used by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Adj,
    Adp,
    Adv,
    Cconj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Verb,
    X,
}

impl PartOfSpeech {
    /// Coordinating conjunction or adposition
    pub fn is_connective(&self) -> bool {
        matches!(self, Self::Cconj | Self::Adp)
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Cconj => "CCONJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PartOfSpeech {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADJ" => Ok(Self::Adj),
            "ADP" => Ok(Self::Adp),
            "ADV" => Ok(Self::Adv),
            "CCONJ" => Ok(Self::Cconj),
            "NOUN" => Ok(Self::Noun),
            "NUM" => Ok(Self::Num),
            "PART" => Ok(Self::Part),
            "PRON" => Ok(Self::Pron),
            "PROPN" => Ok(Self::Propn),
            "PUNCT" => Ok(Self::Punct),
            "VERB" => Ok(Self::Verb),
            "X" => Ok(Self::X),
            other => Err(format!("unknown part of speech: {other}")),
        }
    }
}

/// One analyzed token
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    /// Whitespace follows the token in the source phrase
    pub whitespace: bool,
}

/// Join pieces back together, a single space after each piece that had
/// whitespace behind it in the source
pub fn rejoin<'a>(pieces: impl IntoIterator<Item = (&'a str, bool)>) -> String {
    let mut out = String::new();
    for (text, whitespace) in pieces {
        out.push_str(text);
        if whitespace {
            out.push(' ');
        }
    }
    out.truncate(out.trim_end().len());
    out
}

// ============================================================================
// Tokenizer
// ============================================================================

/// Words, with inner apostrophes (`Рок'н'ролл`), or single symbols
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").expect("token pattern must compile")
});

/// Split text into word and punctuation tokens
///
/// `Мастер-класс` yields `Мастер`, `-`, `класс`; `Что?` yields `Что`, `?`.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Tokens paired with whether whitespace follows them
pub fn tokenize_spaced(text: &str) -> Vec<(&str, bool)> {
    TOKEN
        .find_iter(text)
        .map(|m| (m.as_str(), text[m.end()..].starts_with(char::is_whitespace)))
        .collect()
}

/// Uppercase the first character, leave the rest untouched
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Lexicon Analyzer
// ============================================================================

#[derive(Debug, Clone)]
struct LexEntry {
    lemma: String,
    pos: PartOfSpeech,
}

static BUILTIN_LEXICON: Lazy<HashMap<String, LexEntry>> = Lazy::new(|| {
    parse_lexicon(include_str!("data/lexicon.tsv")).expect("bundled lexicon must parse")
});

/// Adjective endings used to guess the part of speech of unknown words
const ADJECTIVE_ENDINGS: &[&str] = &[
    "ый", "ий", "ой", "ая", "яя", "ое", "ее", "ые", "ие", "ого", "его", "ому", "ему", "ую", "юю",
];

/// Parse a TSV lexicon: `form<TAB>lemma<TAB>POS`, `#` starts a comment
fn parse_lexicon(content: &str) -> Result<HashMap<String, LexEntry>> {
    let mut entries = HashMap::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(MistyError::Lexicon {
                line: idx + 1,
                message: format!("expected 3 tab-separated fields, got {}", fields.len()),
            });
        }

        let pos = fields[2]
            .parse::<PartOfSpeech>()
            .map_err(|message| MistyError::Lexicon {
                line: idx + 1,
                message,
            })?;

        entries.insert(
            fields[0].to_lowercase(),
            LexEntry {
                lemma: fields[1].to_lowercase(),
                pos,
            },
        );
    }

    Ok(entries)
}

/// Dictionary-backed analyzer with suffix heuristics for unknown words
///
/// Starts from the bundled Russian lexicon. A user lexicon can be merged
/// on top with [`LexiconAnalyzer::with_file`].
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    entries: HashMap<String, LexEntry>,
}

impl LexiconAnalyzer {
    /// Create an analyzer over the bundled lexicon
    pub fn new() -> Self {
        Self {
            entries: BUILTIN_LEXICON.clone(),
        }
    }

    /// Create an analyzer with no dictionary, heuristics only
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Merge a TSV lexicon file over the current entries
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let extra = parse_lexicon(&content)?;
        tracing::debug!(
            "Loaded {} lexicon entries from {}",
            extra.len(),
            path.as_ref().display()
        );
        self.entries.extend(extra);
        Ok(self)
    }

    /// Add a single entry
    pub fn with_entry(mut self, form: &str, lemma: &str, pos: PartOfSpeech) -> Self {
        self.entries.insert(
            form.to_lowercase(),
            LexEntry {
                lemma: lemma.to_lowercase(),
                pos,
            },
        );
        self
    }

    /// Number of known word forms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn analyze_token(&self, token: &str, whitespace: bool) -> Analysis {
        let starts_upper = token.chars().next().is_some_and(char::is_uppercase);

        if !token.chars().any(char::is_alphanumeric) {
            return Analysis {
                text: token.to_string(),
                lemma: token.to_string(),
                pos: PartOfSpeech::Punct,
                whitespace,
            };
        }

        if token.chars().all(|c| c.is_ascii_digit()) {
            return Analysis {
                text: token.to_string(),
                lemma: token.to_string(),
                pos: PartOfSpeech::Num,
                whitespace,
            };
        }

        if let Some(entry) = self.entries.get(&token.to_lowercase()) {
            let lemma = if entry.pos == PartOfSpeech::Propn && starts_upper {
                capitalize(&entry.lemma)
            } else {
                entry.lemma.clone()
            };
            return Analysis {
                text: token.to_string(),
                lemma,
                pos: entry.pos,
                whitespace,
            };
        }

        let letters = token.chars().filter(|c| c.is_alphabetic()).count();
        let all_upper = letters > 1 && !token.chars().any(char::is_lowercase);

        // Unknown acronyms and capitalized words are treated as names
        if all_upper || starts_upper {
            return Analysis {
                text: token.to_string(),
                lemma: token.to_string(),
                pos: PartOfSpeech::Propn,
                whitespace,
            };
        }

        let lower = token.to_lowercase();
        let pos = if ADJECTIVE_ENDINGS.iter().any(|e| lower.ends_with(e)) {
            PartOfSpeech::Adj
        } else {
            PartOfSpeech::Noun
        };

        Analysis {
            text: token.to_string(),
            lemma: lower,
            pos,
            whitespace,
        }
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MorphAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Analysis> {
        tokenize_spaced(text)
            .into_iter()
            .map(|(token, whitespace)| self.analyze_token(token, whitespace))
            .collect()
    }
}
