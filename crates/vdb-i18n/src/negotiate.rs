//! Language negotiation for translation resources.
//!
//! The active language is taken from the first source that yields a usable
//! tag, in this order:
//!
//! 1. an explicit override (the `language` query parameter),
//! 2. the location fragment (`#language=de`),
//! 3. the environment language (`LC_ALL`, then `LANG`), truncated to its
//!    two-letter primary subtag,
//! 4. the configured default.
//!
//! Tags that contain anything other than ASCII letters, digits, `-` or `_`
//! are rejected because they are spliced into resource names.

use std::env;

/// Candidate language sources, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSources {
    pub query: Option<String>,
    pub fragment: Option<String>,
    pub environment: Option<String>,
}

impl LanguageSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the override and fragment candidates from a location.
    ///
    /// `search` is the query string (leading `?` optional), `hash` the
    /// fragment (leading `#` optional).
    ///
    /// ```
    /// use vdb_i18n::negotiate::LanguageSources;
    ///
    /// let sources = LanguageSources::from_location("?theme=dark&language=de", "#language=fr");
    /// assert_eq!(sources.query.as_deref(), Some("de"));
    /// assert_eq!(sources.fragment.as_deref(), Some("fr"));
    /// ```
    #[must_use]
    pub fn from_location(search: &str, hash: &str) -> Self {
        Self {
            query: query_parameter(search, "language"),
            fragment: fragment_value(hash),
            environment: None,
        }
    }

    /// Fill the environment candidate from `LC_ALL` / `LANG`.
    #[must_use]
    pub fn with_system_environment(mut self) -> Self {
        let lc_all = env::var("LC_ALL").ok();
        let lang = env::var("LANG").ok();
        self.environment = environment_language(lc_all.as_deref(), lang.as_deref());
        self
    }

    #[must_use]
    pub fn with_query(mut self, tag: impl Into<String>) -> Self {
        self.query = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_environment(mut self, tag: impl Into<String>) -> Self {
        self.environment = Some(tag.into());
        self
    }

    /// Pick the active language, falling back to `default`.
    #[must_use]
    pub fn negotiate(&self, default: &str) -> String {
        let env_primary = self.environment.as_deref().and_then(primary_subtag);
        [self.query.as_deref(), self.fragment.as_deref(), env_primary.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|&tag| {
                if tag.is_empty() {
                    return false;
                }
                let ok = is_resource_safe(tag);
                if !ok {
                    tracing::warn!(tag, "ignoring language tag with unsupported characters");
                }
                ok
            })
            .map_or_else(|| default.to_owned(), str::to_owned)
    }
}

/// Whether `tag` may be used inside a resource name.
#[must_use]
pub fn is_resource_safe(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn query_parameter(search: &str, name: &str) -> Option<String> {
    let search = search.strip_prefix('?').unwrap_or(search);
    search
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

fn fragment_value(hash: &str) -> Option<String> {
    hash.split('=')
        .nth(1)
        .map(str::to_owned)
        .filter(|value| !value.is_empty())
}

fn environment_language(lc_all: Option<&str>, lang: Option<&str>) -> Option<String> {
    lc_all
        .and_then(normalize_environment)
        .or_else(|| lang.and_then(normalize_environment))
}

fn normalize_environment(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw).trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("c") || raw.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(raw.replace('_', "-"))
}

fn primary_subtag(tag: &str) -> Option<String> {
    let primary: String = tag.trim().chars().take(2).collect();
    (!primary.is_empty()).then(|| primary.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_wins_over_everything() {
        let sources = LanguageSources::from_location("?language=de", "#language=fr")
            .with_environment("es-ES");
        assert_eq!(sources.negotiate("en"), "de");
    }

    #[test]
    fn fragment_used_without_query() {
        let sources = LanguageSources::from_location("", "#language=fr").with_environment("es");
        assert_eq!(sources.negotiate("en"), "fr");
    }

    #[test]
    fn environment_truncated_to_primary_subtag() {
        let sources = LanguageSources::new().with_environment("pt-BR");
        assert_eq!(sources.negotiate("en"), "pt");
    }

    #[test]
    fn default_when_nothing_is_set() {
        assert_eq!(LanguageSources::new().negotiate("en"), "en");
    }

    #[test]
    fn unsafe_tags_are_skipped() {
        let sources = LanguageSources::new()
            .with_query("../secrets")
            .with_environment("de_DE");
        assert_eq!(sources.negotiate("en"), "de");
    }

    #[test]
    fn environment_prefers_lc_all() {
        assert_eq!(
            environment_language(Some("fr_FR.UTF-8"), Some("en_US.UTF-8")).as_deref(),
            Some("fr-FR")
        );
        assert_eq!(
            environment_language(None, Some("en_US.UTF-8")).as_deref(),
            Some("en-US")
        );
        assert_eq!(environment_language(Some("C"), None), None);
    }

    #[test]
    fn query_parameter_parsing() {
        assert_eq!(query_parameter("a=1&language=it", "language").as_deref(), Some("it"));
        assert_eq!(query_parameter("?language=", "language"), None);
        assert_eq!(query_parameter("?lang=de", "language"), None);
    }

    #[test]
    fn fragment_takes_text_after_equals() {
        assert_eq!(fragment_value("#language=nl").as_deref(), Some("nl"));
        assert_eq!(fragment_value("#section"), None);
    }
}
