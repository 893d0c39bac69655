//! Article record and keyword tokenization
//!
//! Article files are JSON arrays of objects. Field names on disk differ
//! from the names used in code (`uuid` -> `id`, `text` -> `body`,
//! `published` -> `publish_date`). Unknown fields are ignored; missing
//! fields and `null` values become empty strings or an empty list. Numbers
//! and booleans in text fields are kept as their JSON text.

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Language tag whose bodies feed the keyword table
pub const ENGLISH: &str = "english";

/// ASCII whitespace runs (space, \t, \n, \v, \f, \r)
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\s)+").expect("Invalid whitespace regex"));

/// Anything that is not a lowercase Latin letter
static NON_LOWER_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z]").expect("Invalid token filter regex"));

/// One news article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "uuid", default, deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub author: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,

    #[serde(rename = "text", default, deserialize_with = "lenient_string")]
    pub body: String,

    /// Sortable timestamp string, compared lexicographically
    #[serde(rename = "published", default, deserialize_with = "lenient_string")]
    pub publish_date: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub language: String,

    /// May repeat a category
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
}

impl Article {
    /// Whether this article's body contributes to keyword counts
    pub fn is_english(&self) -> bool {
        self.language == ENGLISH
    }

    /// Normalized tokens of the body, empties included
    pub fn keywords(&self) -> Vec<String> {
        tokenize(&self.body)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text field that also accepts numbers and booleans
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a string, found {}", other))),
    }
}

/// Split a body into normalized tokens.
///
/// Lower-cases the text, splits on runs of ASCII whitespace and strips every
/// character outside `a-z` from each piece. Pieces that end up empty are
/// returned as empty strings; callers drop them before counting.
pub fn tokenize(body: &str) -> Vec<String> {
    if body.is_empty() {
        return Vec::new();
    }

    let lowered = body.to_lowercase();
    WHITESPACE_RUN
        .split(&lowered)
        .map(|piece| NON_LOWER_ALPHA.replace_all(piece, "").into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_and_case() {
        assert_eq!(tokenize("Dog Cat dog!"), vec!["dog", "cat", "dog"]);
    }

    #[test]
    fn test_tokenize_keeps_empty_pieces() {
        // "42" and "--" collapse to nothing but keep their slots
        assert_eq!(tokenize("a 42 -- b"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn test_tokenize_drops_accents_and_digits_inside_words() {
        assert_eq!(tokenize("Café r2d2 naïve"), vec!["caf", "rd", "nave"]);
    }

    #[test]
    fn test_tokenize_splits_on_whitespace_runs() {
        assert_eq!(tokenize("one\t\ttwo\n\r three"), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_tokenize_leading_whitespace_yields_empty_first_piece() {
        assert_eq!(tokenize("  lead"), vec!["", "lead"]);
    }

    #[test]
    fn test_tokenize_non_ascii_space_does_not_split() {
        assert_eq!(tokenize("foo\u{a0}bar"), vec!["foobar"]);
    }

    #[test]
    fn test_tokenize_empty_body() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_article_json_mapping() {
        let json = r#"{
            "uuid": "abc",
            "title": "T",
            "author": "A",
            "url": "http://x",
            "text": "body",
            "published": "2024-01-01T00:00:00",
            "language": "english",
            "categories": ["sports", "sports"],
            "thread": {"ignored": true}
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, "abc");
        assert_eq!(article.body, "body");
        assert_eq!(article.publish_date, "2024-01-01T00:00:00");
        assert_eq!(article.categories, vec!["sports", "sports"]);
        assert!(article.is_english());
    }

    #[test]
    fn test_article_scalar_fields_become_text() {
        let article: Article =
            serde_json::from_str(r#"{"uuid": 42, "published": 20240101, "title": true}"#).unwrap();
        assert_eq!(article.id, "42");
        assert_eq!(article.publish_date, "20240101");
        assert_eq!(article.title, "true");
    }

    #[test]
    fn test_article_object_in_text_field_rejected() {
        assert!(serde_json::from_str::<Article>(r#"{"uuid": {"nested": 1}}"#).is_err());
    }

    #[test]
    fn test_article_missing_and_null_fields() {
        let article: Article =
            serde_json::from_str(r#"{"uuid": "x", "author": null, "categories": null}"#).unwrap();
        assert_eq!(article.id, "x");
        assert_eq!(article.author, "");
        assert_eq!(article.title, "");
        assert!(article.categories.is_empty());
        assert!(!article.is_english());
    }
}
