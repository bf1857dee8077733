//! Resource sources and the localized-then-default load sequence.
//!
//! A [`ResourceSource`] answers "give me the resource with this name" with
//! either its text or an explicit not-found. [`load_translations`] asks for
//! the localized resource first and, on not-found only, retries against the
//! untagged default. Other failures are returned as-is; nothing is retried.
//! There is no cancellation or timeout.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::ResourceConfig;
use crate::resource::{I18nError, Translations};

/// Outcome of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Found(String),
    NotFound,
}

/// Anything that can serve translation resources by name.
pub trait ResourceSource {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<Fetched, I18nError>>;
}

/// Serves resources from a directory on disk.
///
/// Reads are synchronous; the returned future is ready on first poll.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceSource for DirectorySource {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<Fetched, I18nError>> {
        let path = self.root.join(name);
        let result = match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Fetched::Found(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Fetched::NotFound),
            Err(e) => Err(I18nError::Io {
                resource: name.to_owned(),
                message: e.to_string(),
            }),
        };
        std::future::ready(result)
    }
}

/// Serves resources from memory. Useful for embedded bundles and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: HashMap<String, String>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.resources.insert(name.into(), text.into());
        self
    }
}

impl ResourceSource for MemorySource {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<Fetched, I18nError>> {
        let result = self
            .resources
            .get(name)
            .map_or(Fetched::NotFound, |text| Fetched::Found(text.clone()));
        std::future::ready(Ok(result))
    }
}

/// Translations plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTranslations {
    /// Name of the resource that was actually read.
    pub resource: String,
    /// `true` when the localized resource was missing and the default was used.
    pub fell_back: bool,
    pub translations: Translations,
}

/// Load the resource for `language`, falling back to the default resource.
pub async fn load_translations<S: ResourceSource>(
    source: &S,
    config: &ResourceConfig,
    language: &str,
) -> Result<LoadedTranslations, I18nError> {
    if !crate::negotiate::is_resource_safe(language) {
        return Err(I18nError::InvalidLanguage(language.to_owned()));
    }
    let localized = config.localized_name(language);
    if let Fetched::Found(text) = source.fetch(&localized).await? {
        tracing::debug!(resource = %localized, "loaded translations");
        return Ok(LoadedTranslations {
            resource: localized,
            fell_back: false,
            translations: Translations::parse(&text),
        });
    }

    let fallback = config.default_name();
    tracing::info!(
        missing = %localized,
        fallback = %fallback,
        "localized translations not found, using default resource"
    );
    match source.fetch(&fallback).await? {
        Fetched::Found(text) => Ok(LoadedTranslations {
            resource: fallback,
            fell_back: true,
            translations: Translations::parse(&text),
        }),
        Fetched::NotFound => Err(I18nError::NotFound { resource: fallback }),
    }
}
