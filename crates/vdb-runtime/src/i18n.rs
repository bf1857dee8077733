//! Translation model.
//!
//! An [`I18nModel`] is an ordinary [`Model`] named `i18n` whose data is a
//! flat map of translation keys. It starts out holding a `status` placeholder and is
//! filled by [`I18nModel::initialize`], which negotiates a language, loads
//! the matching resource (falling back to the default one) and binds the
//! property elements that reference it.

use serde_json::Value;
use vdb_core::{BindingKind, ElementTree};
use vdb_i18n::{LanguageSources, ResourceConfig, ResourceSource, load_translations};

use crate::error::ModelError;
use crate::model::Model;

/// Model name used in annotations (`i18n>Key`).
pub const I18N_MODEL: &str = "i18n";

#[derive(Debug, Clone)]
pub struct I18nModel {
    model: Model,
    config: ResourceConfig,
    language: Option<String>,
    resource: Option<String>,
}

impl Default for I18nModel {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nModel {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ResourceConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ResourceConfig) -> Self {
        let placeholder = serde_json::json!({ "status": config.placeholder.as_str() });
        Self {
            model: Model::new(I18N_MODEL, placeholder),
            config,
            language: None,
            resource: None,
        }
    }

    /// Load translations and bind every `i18n` property element in `tree`.
    ///
    /// Returns the loaded key/value data.
    pub async fn initialize<S: ResourceSource>(
        &mut self,
        tree: &mut ElementTree,
        source: &S,
        sources: &LanguageSources,
    ) -> Result<&Value, ModelError> {
        self.config.validate()?;
        let language = sources.negotiate(&self.config.default_language);
        let loaded = load_translations(source, &self.config, &language).await?;
        tracing::info!(
            language = %language,
            resource = %loaded.resource,
            fell_back = loaded.fell_back,
            keys = loaded.translations.len(),
            "translations loaded"
        );

        self.model.replace_data(loaded.translations.to_value());
        self.language = Some(language);
        self.resource = Some(loaded.resource);
        self.model
            .initialize_subscribers(tree, BindingKind::Property)?;
        Ok(self.model.data())
    }

    /// Negotiated language, once initialized.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Resource the translations were read from, once initialized.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Translation for `key`, if loaded and present with a value.
    #[must_use]
    pub fn translate(&self, key: &str) -> Option<&str> {
        self.model.data().get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Hand the underlying model to a [`crate::Page`].
    #[must_use]
    pub fn into_model(self) -> Model {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use vdb_core::Element;
    use vdb_i18n::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new()
            .with("i18n/i18n.properties", "Title=Supermarket\nAdd=Add")
            .with("i18n/i18n_de.properties", "Title=Supermarkt\nAdd=Hinzufügen\nBroken")
    }

    fn tree() -> (ElementTree, vdb_core::ElementId, vdb_core::ElementId) {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let title = tree
            .append(root, Element::new("h1").bind_property("i18n>Title"))
            .unwrap();
        let button = tree
            .append(
                root,
                Element::new("button").bind_property("[i18n>Add>text, shop>label>title]"),
            )
            .unwrap();
        (tree, title, button)
    }

    #[test]
    fn starts_with_placeholder() {
        let model = I18nModel::new();
        assert_eq!(
            model.model().data(),
            &json!({ "status": "about to load i18n files..." })
        );
        assert_eq!(model.language(), None);
    }

    #[test]
    fn loads_negotiated_language() {
        let (mut tree, title, button) = tree();
        let mut i18n = I18nModel::new();
        let sources = LanguageSources::new().with_query("de");
        let data = block_on(i18n.initialize(&mut tree, &source(), &sources)).unwrap();

        assert_eq!(data["Broken"], Value::Null);
        assert_eq!(i18n.language(), Some("de"));
        assert_eq!(i18n.resource(), Some("i18n/i18n_de.properties"));
        assert_eq!(i18n.translate("Title"), Some("Supermarkt"));
        assert_eq!(i18n.translate("Broken"), None);
        assert_eq!(tree.element(title).unwrap().text(), "Supermarkt");
        assert_eq!(
            tree.element(button).unwrap().property("text"),
            Some(&json!("Hinzufügen"))
        );
    }

    #[test]
    fn falls_back_to_default_resource() {
        let (mut tree, title, _) = tree();
        let mut i18n = I18nModel::new();
        let sources = LanguageSources::new().with_query("ja");
        block_on(i18n.initialize(&mut tree, &source(), &sources)).unwrap();
        assert_eq!(i18n.resource(), Some("i18n/i18n.properties"));
        assert_eq!(tree.element(title).unwrap().text(), "Supermarket");
    }

    #[test]
    fn missing_resources_leave_placeholder() {
        let (mut tree, title, _) = tree();
        let mut i18n = I18nModel::new();
        let err = block_on(i18n.initialize(&mut tree, &MemorySource::new(), &LanguageSources::new()))
            .unwrap_err();
        assert!(matches!(err, ModelError::I18n(_)));
        assert_eq!(
            i18n.model().data()["status"],
            json!("about to load i18n files...")
        );
        assert_eq!(tree.element(title).unwrap().text(), "");
    }
}
