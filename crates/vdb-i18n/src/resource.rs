//! Flat `key=value` translation resources.
//!
//! # Format
//!
//! One pair per line. There is no escaping and no comment syntax; the key is
//! everything before the first `=`, the value everything after it. A
//! trailing `\r` is trimmed so files saved with CRLF endings parse the same.
//!
//! # Failure Modes
//!
//! | Input | Behavior |
//! |-------|----------|
//! | Line without `=` | Key present with no value (`null` in the model) |
//! | Blank line | Skipped |
//! | Duplicate key | Last occurrence wins |
//! | Empty resource | Empty translation set |

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Errors from i18n operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// Reading a resource failed for a reason other than "not found".
    Io { resource: String, message: String },
    /// Neither the localized nor the default resource exists.
    NotFound { resource: String },
    /// A language tag contained characters that cannot form a resource name.
    InvalidLanguage(String),
    /// A configuration file could not be parsed.
    Config(String),
}

impl std::fmt::Display for I18nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { resource, message } => write!(f, "failed to read '{resource}': {message}"),
            Self::NotFound { resource } => write!(f, "translation resource '{resource}' not found"),
            Self::InvalidLanguage(tag) => write!(f, "invalid language tag: {tag}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for I18nError {}

/// Parsed translations for a single language.
///
/// # Example
///
/// ```
/// use vdb_i18n::resource::Translations;
///
/// let t = Translations::parse("Title=Supermarket\nBananas=Bananas 🍌\nbroken");
/// assert_eq!(t.get("Title"), Some("Supermarket"));
/// assert_eq!(t.get("broken"), None);
/// assert!(t.contains_key("broken"));
/// assert_eq!(t.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    entries: BTreeMap<String, Option<String>>,
}

impl Translations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `key=value` resource.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut translations = Self::new();
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => translations.insert(key, value),
                None => {
                    translations.entries.insert(line.to_owned(), None);
                }
            }
        }
        translations
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Look up a translated string. Keys without a value return `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Option::as_deref)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Convert into a flat JSON object suitable as model data.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = v.as_ref().map_or(Value::Null, |s| Value::String(s.clone()));
                (k.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn parses_pairs() {
        let t = Translations::parse("a=1\nb=two words");
        assert_eq!(t.get("a"), Some("1"));
        assert_eq!(t.get("b"), Some("two words"));
    }

    #[test]
    fn value_keeps_text_after_first_equals() {
        let t = Translations::parse("formula=a=b");
        assert_eq!(t.get("formula"), Some("a=b"));
    }

    #[test]
    fn line_without_equals_has_no_value() {
        let t = Translations::parse("orphan\nkey=v");
        assert!(t.contains_key("orphan"));
        assert_eq!(t.get("orphan"), None);
        assert_eq!(t.to_value()["orphan"], Value::Null);
    }

    #[test]
    fn crlf_and_blank_lines() {
        let t = Translations::parse("a=1\r\n\r\nb=2\r\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("a"), Some("1"));
        assert_eq!(t.get("b"), Some("2"));
    }

    #[test]
    fn duplicate_key_last_wins() {
        let t = Translations::parse("a=1\na=2");
        assert_eq!(t.get("a"), Some("2"));
    }

    #[test]
    fn empty_value_is_empty_string() {
        let t = Translations::parse("a=");
        assert_eq!(t.get("a"), Some(""));
    }

    #[test]
    fn to_value_is_flat_object() {
        let t = Translations::parse("Apples=Apples 🍎\nBananas=Bananas");
        assert_eq!(
            t.to_value(),
            json!({"Apples": "Apples 🍎", "Bananas": "Bananas"})
        );
    }

    #[test]
    fn error_display() {
        let err = I18nError::NotFound {
            resource: "i18n/i18n.properties".into(),
        };
        assert_eq!(
            err.to_string(),
            "translation resource 'i18n/i18n.properties' not found"
        );
    }

    proptest! {
        #[test]
        fn every_well_formed_pair_survives(
            pairs in proptest::collection::btree_map("[A-Za-z][A-Za-z0-9_]{0,8}", "[^\n\r]{0,16}", 0..12)
        ) {
            let text: String = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}\n"))
                .collect();
            let t = Translations::parse(&text);
            prop_assert_eq!(t.len(), pairs.len());
            for (k, v) in &pairs {
                prop_assert_eq!(t.get(k), Some(v.as_str()));
            }
        }
    }
}
