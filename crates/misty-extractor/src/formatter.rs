//! Phrase formatting module
//!
//! Cleans punctuation and spacing artifacts that token joining and
//! normalization leave behind, then applies per-group rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::morph::capitalize;
use crate::normalizer::Normalizer;
use misty_core::{EntityGroup, MistyError, Result};

// ============================================================================
// Patterns
// ============================================================================

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("formatter pattern must compile")
}

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));
static SPACE_BEFORE_COMMA: Lazy<Regex> = Lazy::new(|| compile(r"\s+,"));
static OPEN_PAREN: Lazy<Regex> = Lazy::new(|| compile(r"\(\s+"));
static CLOSE_PAREN: Lazy<Regex> = Lazy::new(|| compile(r"\s+\)"));
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| compile(r"\.(?:\s*\.){2}"));
static HYPHEN: Lazy<Regex> = Lazy::new(|| compile(r"\s*-\s*"));
static SPACE_BEFORE_COLON: Lazy<Regex> = Lazy::new(|| compile(r"\s+:"));
static SPACE_BEFORE_PERIOD: Lazy<Regex> = Lazy::new(|| compile(r"\s+\."));
static LOCATIVE_PREPOSITION: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^(?:в|во|на)\s+"));
static ORDINAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    compile(r"(\d)-?(?:ого|его|ый|ий|ой|го|ое|ее|ая|яя|ья|й|е|я|th|st|nd|rd)\b")
});
static DIGIT_SPACE_PERIOD: Lazy<Regex> = Lazy::new(|| compile(r"(\d)\s+\."));
static PERIOD_SPACE_DIGIT: Lazy<Regex> = Lazy::new(|| compile(r"\.\s+(\d)"));
static DIGIT_SEPARATOR_DIGIT: Lazy<Regex> = Lazy::new(|| compile(r"(\d)\s*[.:]\s*(\d)"));

// ============================================================================
// Formatter
// ============================================================================

/// Normalizes and formats phrases for display
#[derive(Clone)]
pub struct Formatter {
    normalizer: Normalizer,
    acronyms: Vec<String>,
}

impl Formatter {
    pub fn new(normalizer: Normalizer, acronyms: Vec<String>) -> Self {
        Self {
            normalizer,
            acronyms,
        }
    }

    /// Normalize a phrase for its group, then clean it up
    pub fn format(&self, phrase: &str, group: EntityGroup) -> Result<String> {
        if group == EntityGroup::Outside {
            return Err(MistyError::UnsupportedGroup(group));
        }
        let normalized = self.normalizer.normalize(phrase, group);
        self.clean_up(&normalized, group)
    }

    /// Punctuation and spacing cleanup without normalization
    pub fn clean_up(&self, phrase: &str, group: EntityGroup) -> Result<String> {
        let text = collapse_spaces(phrase);
        let text = tighten_quotes(&text);
        let text = SPACE_BEFORE_COMMA.replace_all(&text, ",");
        let text = OPEN_PAREN.replace_all(&text, "(");
        let text = CLOSE_PAREN.replace_all(&text, ")");
        let text = ELLIPSIS.replace_all(&text, "...");
        let text = HYPHEN.replace_all(&text, "-").into_owned();

        let text = match group {
            EntityGroup::Name | EntityGroup::Event => {
                let text = SPACE_BEFORE_COLON.replace_all(&text, ":");
                SPACE_BEFORE_PERIOD.replace_all(&text, ".").into_owned()
            }
            EntityGroup::Place => {
                let text = LOCATIVE_PREPOSITION.replace(&text, "");
                let text = ORDINAL_SUFFIX.replace_all(&text, "$1");
                SPACE_BEFORE_PERIOD.replace_all(&text, ".").into_owned()
            }
            EntityGroup::Time => format_time(&text),
            EntityGroup::Date => {
                let text = DIGIT_SPACE_PERIOD.replace_all(&text, "$1.");
                let text = PERIOD_SPACE_DIGIT.replace_all(&text, ".$1");
                let text = SPACE_BEFORE_PERIOD.replace_all(&text, ".");
                ORDINAL_SUFFIX.replace_all(&text, "$1").into_owned()
            }
            EntityGroup::Subtitle => sentence_case(&text, &self.acronyms),
            EntityGroup::Outside => return Err(MistyError::UnsupportedGroup(group)),
        };

        Ok(collapse_spaces(&text))
    }
}

fn collapse_spaces(text: &str) -> String {
    MULTI_SPACE.replace_all(text.trim(), " ").into_owned()
}

/// Pull quotes onto the words they enclose
///
/// Quotes pair up left to right. Whitespace after an opening quote and
/// before its closing quote is removed; a trailing opening quote with no
/// partner keeps only the whitespace before it.
fn tighten_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let quotes: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == '"')
        .map(|(i, _)| i)
        .collect();
    let mut drop = vec![false; chars.len()];

    for pair in quotes.chunks(2) {
        let open = pair[0];
        let mut i = open + 1;
        while i < chars.len() && chars[i].is_whitespace() {
            drop[i] = true;
            i += 1;
        }
        if let Some(&close) = pair.get(1) {
            let mut j = close;
            while j > open + 1 && chars[j - 1].is_whitespace() {
                j -= 1;
                drop[j] = true;
            }
        }
    }

    chars
        .into_iter()
        .zip(drop)
        .filter(|(_, dropped)| !dropped)
        .map(|(c, _)| c)
        .collect()
}

/// `18 : 30`, `18 . 30`, `18 час 30` and `18. 30` all become `18:30`
fn format_time(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let starts_with_digit = |t: &str| t.chars().next().is_some_and(|c| c.is_ascii_digit());

    if tokens.len() == 3 && starts_with_digit(tokens[0]) && starts_with_digit(tokens[2]) {
        return format!("{}:{}", tokens[0], tokens[2]);
    }

    DIGIT_SEPARATOR_DIGIT
        .replace_all(text, "$1:$2")
        .into_owned()
}

/// Sentence-case an all-caps phrase, keeping known acronyms
pub fn sentence_case(text: &str, acronyms: &[String]) -> String {
    let has_upper = text.chars().any(char::is_uppercase);
    if !has_upper || text.chars().any(char::is_lowercase) {
        return text.to_string();
    }

    let cased = capitalize(&text.to_lowercase());

    text.split_whitespace()
        .zip(cased.split_whitespace())
        .map(|(original, lowered)| {
            let bare: String = original.chars().filter(|c| c.is_alphanumeric()).collect();
            if acronyms.iter().any(|a| *a == bare) {
                original
            } else {
                lowered
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
