//! Where translation resources live and how they are named.
//!
//! With the `config-file` feature, a [`ResourceConfig`] can be loaded from
//! TOML; every field is optional and falls back to [`ResourceConfig::default`].
//!
//! ```toml
//! base = "assets/i18n"
//! prefix = "messages"
//! default_language = "de"
//! ```

use crate::resource::I18nError;

/// Resource naming and model defaults for the translation model.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default, deny_unknown_fields))]
pub struct ResourceConfig {
    /// Directory (or URL prefix) holding the resources. Empty means "top level".
    pub base: String,
    /// File stem shared by all resources (`i18n` → `i18n_de.properties`).
    pub prefix: String,
    pub extension: String,
    /// Language used when no source yields a tag.
    pub default_language: String,
    /// Model data shown before the resources finish loading.
    pub placeholder: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base: "i18n".into(),
            prefix: "i18n".into(),
            extension: "properties".into(),
            default_language: "en".into(),
            placeholder: "about to load i18n files...".into(),
        }
    }
}

impl ResourceConfig {
    /// Resource name for a specific language, e.g. `i18n/i18n_de.properties`.
    #[must_use]
    pub fn localized_name(&self, language: &str) -> String {
        self.join(&format!("{}_{language}.{}", self.prefix, self.extension))
    }

    /// Untagged fallback resource name, e.g. `i18n/i18n.properties`.
    #[must_use]
    pub fn default_name(&self) -> String {
        self.join(&format!("{}.{}", self.prefix, self.extension))
    }

    fn join(&self, file: &str) -> String {
        let base = self.base.trim_end_matches('/');
        if base.is_empty() {
            file.to_owned()
        } else {
            format!("{base}/{file}")
        }
    }

    /// Parse a TOML document into a config.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(text: &str) -> Result<Self, I18nError> {
        toml::from_str(text).map_err(|e| I18nError::Config(e.to_string()))
    }

    /// Reject configurations that cannot produce valid resource names.
    pub fn validate(&self) -> Result<(), I18nError> {
        if self.prefix.is_empty() || self.extension.is_empty() {
            return Err(I18nError::Config(
                "prefix and extension must not be empty".into(),
            ));
        }
        if !crate::negotiate::is_resource_safe(&self.default_language) {
            return Err(I18nError::InvalidLanguage(self.default_language.clone()));
        }
        Ok(())
    }
}
