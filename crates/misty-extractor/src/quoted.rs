//! Quoted name recovery
//!
//! Normalization can mangle punctuation inside an official quoted title.
//! When a name phrase opens with a quote, the literal `"…"` run from the
//! raw text is used instead.

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*""#).expect("quoted run pattern must compile"));

/// Map typographic double quotes to `"`
pub fn standardize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '«' | '»' | '“' | '”' | '„' => '"',
            other => other,
        })
        .collect()
}

/// Quoted runs of `raw` that contain `formatted`, quotes included
///
/// Falls back to the formatted phrase itself when no run contains it.
pub fn recover_quoted(formatted: &str, raw: &str) -> Vec<String> {
    let raw = standardize_quotes(raw);
    let needle = formatted.to_lowercase();

    let runs: Vec<String> = QUOTED_RUN
        .find_iter(&raw)
        .map(|m| m.as_str())
        .filter(|run| run.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect();

    if runs.is_empty() {
        tracing::debug!("No quoted run in source contains {:?}", formatted);
        return vec![formatted.to_string()];
    }
    runs
}
