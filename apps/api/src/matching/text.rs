//! Text normalization shared by the scoring policies.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::catalog::models::{value_to_text, ProfileRecord};

/// Word tokens of two or more characters. Unicode-aware.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// Concatenates every non-blank field of a record, in field order.
pub fn record_document(record: &ProfileRecord) -> String {
    let parts: Vec<String> = record
        .fields()
        .filter_map(|(_, value)| value_to_text(value))
        .collect();
    parts.join(" ")
}

/// Lower-cases and splits text into TF-IDF tokens. Repeats are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Keyword tags: lower-cased, punctuation stripped, whitespace split, de-duplicated.
pub fn keyword_tags(text: &str) -> BTreeSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}
