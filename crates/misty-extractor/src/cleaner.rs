//! Raw text pre-cleaning
//!
//! Strips social-media noise the tagger was not trained on: links,
//! hashtags, mentions and emoji. Quote glyphs are standardized so quoted
//! titles survive tokenization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::quoted::standardize_quotes;
use crate::TextCleaner;

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("url pattern must compile"));
static HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[\p{L}\p{N}_]+").expect("hashtag pattern must compile"));
static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[\p{L}\p{N}_.]+").expect("mention pattern must compile"));
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\x{FE0F}\x{200D}\x{20E3}]")
        .expect("emoji pattern must compile")
});
static MULTI_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("space pattern must compile"));

/// Regex-based [`TextCleaner`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexCleaner;

impl RegexCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl TextCleaner for RegexCleaner {
    fn clean(&self, raw: &str) -> String {
        let text = URL.replace_all(raw, " ");
        let text = HASHTAG.replace_all(&text, " ");
        let text = MENTION.replace_all(&text, " ");
        let text = EMOJI.replace_all(&text, " ");
        let text = standardize_quotes(&text).replace(['’', '‘'], "'");

        text.lines()
            .map(|line| MULTI_SPACE.replace_all(line.trim(), " ").into_owned())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
