#![forbid(unsafe_code)]

//! A render tree plus the named models bound to it.
//!
//! [`Page`] is the single owner of both sides of every binding. Change
//! events raised by the tree are routed here to the models their observers
//! name, which is how writes made by one model reach elements shared with
//! another.

use std::collections::BTreeMap;

use serde_json::Value;
use vdb_core::{ElementId, ElementTree};

use crate::error::ModelError;
use crate::list::AppendedItem;
use crate::model::Model;

/// Element tree and models, keyed by model name.
#[derive(Debug, Default)]
pub struct Page {
    tree: ElementTree,
    models: BTreeMap<String, Model>,
}

impl Page {
    #[must_use]
    pub fn new(tree: ElementTree) -> Self {
        Self {
            tree,
            models: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Mutable access to the tree. Structural edits made here are picked up
    /// by the next sweep (removed elements are pruned).
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// Create a JSON model and bind it to the tree.
    pub fn add_json_model(
        &mut self,
        name: impl Into<String>,
        data: Value,
    ) -> Result<&mut Model, ModelError> {
        let name = name.into();
        if self.models.contains_key(&name) {
            return Err(ModelError::DuplicateModel(name));
        }
        let model = Model::json(name, data, &mut self.tree)?;
        self.insert_model(model)
    }

    /// Take ownership of an already bound model.
    pub fn insert_model(&mut self, model: Model) -> Result<&mut Model, ModelError> {
        use std::collections::btree_map::Entry;
        match self.models.entry(model.name().to_owned()) {
            Entry::Occupied(entry) => Err(ModelError::DuplicateModel(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::info!(model = %model.name(), "model added");
                Ok(entry.insert(model))
            }
        }
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.get_mut(name)
    }

    /// Names of all models, sorted.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Borrow one model and the tree together.
    pub fn split(&mut self, name: &str) -> Result<(&mut Model, &mut ElementTree), ModelError> {
        let model = self
            .models
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownModel(name.to_owned()))?;
        Ok((model, &mut self.tree))
    }

    pub fn set_property(
        &mut self,
        model: &str,
        path: &str,
        value: Value,
    ) -> Result<&Value, ModelError> {
        let (model, tree) = self.split(model)?;
        model.set_property(tree, path, value)
    }

    pub fn append_list_item(
        &mut self,
        model: &str,
        path: &str,
        value: Value,
    ) -> Result<AppendedItem<'_>, ModelError> {
        let (model, tree) = self.split(model)?;
        model.append_list_item(tree, path, value)
    }

    pub fn bind_element_and_property(
        &mut self,
        model: &str,
        element: ElementId,
        path: &str,
    ) -> Result<&Value, ModelError> {
        let (model, tree) = self.split(model)?;
        model.bind_element_and_property(tree, element, path)
    }

    pub fn bound_item(&self, model: &str, element: ElementId) -> Result<&Value, ModelError> {
        self.models
            .get(model)
            .ok_or_else(|| ModelError::UnknownModel(model.to_owned()))?
            .bound_item(&self.tree, element)
    }

    /// Simulate user input: set the element's value, then fire a change.
    pub fn input(
        &mut self,
        element: ElementId,
        value: impl Into<String>,
    ) -> Result<usize, ModelError> {
        self.tree.set_value(element, value)?;
        self.fire_change(element)
    }

    /// Route a change on `element` to every model its observers name.
    ///
    /// Returns the number of writes made. Observers naming an unknown model
    /// are logged and skipped.
    pub fn fire_change(&mut self, element: ElementId) -> Result<usize, ModelError> {
        let event = self.tree.fire_change(element)?;
        let mut writes = 0;
        let mut seen: Vec<&str> = Vec::new();
        for observer in &event.observers {
            if seen.contains(&observer.model.as_str()) {
                continue;
            }
            seen.push(&observer.model);
            match self.models.get_mut(&observer.model) {
                Some(model) => writes += model.apply_change(&mut self.tree, &event)?,
                None => {
                    tracing::warn!(model = %observer.model, element = %element, "change observer names an unknown model");
                }
            }
        }
        Ok(writes)
    }

    /// Remove `element` and its subtree, and forget them in every model.
    pub fn remove_element(&mut self, element: ElementId) -> Result<Vec<ElementId>, ModelError> {
        let removed = self.tree.remove(element)?;
        for model in self.models.values_mut() {
            model.forget(&removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vdb_core::Element;

    fn page() -> (Page, ElementId, ElementId) {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let input = tree
            .append(
                root,
                Element::new("input").bind_property("[shop>name>value, audit>last>value]"),
            )
            .unwrap();
        let title = tree
            .append(root, Element::new("h1").bind_property("shop>name"))
            .unwrap();
        (Page::new(tree), input, title)
    }

    #[test]
    fn duplicate_models_rejected() {
        let (mut page, _, _) = page();
        page.add_json_model("shop", json!({ "name": "Shop" })).unwrap();
        assert_eq!(
            page.add_json_model("shop", json!({})).unwrap_err(),
            ModelError::DuplicateModel("shop".into())
        );
        assert!(matches!(
            page.set_property("nope", "x", json!(1)),
            Err(ModelError::UnknownModel(_))
        ));
    }

    #[test]
    fn input_routes_to_every_named_model() {
        let (mut page, input, title) = page();
        page.add_json_model("shop", json!({ "name": "Shop" })).unwrap();
        page.add_json_model("audit", json!({ "last": "" })).unwrap();

        assert_eq!(page.input(input, "Market").unwrap(), 2);
        assert_eq!(
            page.model("shop").unwrap().get("name").unwrap(),
            &json!("Market")
        );
        assert_eq!(
            page.model("audit").unwrap().get("last").unwrap(),
            &json!("Market")
        );
        assert_eq!(page.tree().element(title).unwrap().text(), "Market");
    }

    #[test]
    fn repeated_input_is_idempotent() {
        let (mut page, input, _) = page();
        page.add_json_model("shop", json!({ "name": "Shop" })).unwrap();
        assert_eq!(page.input(input, "Market").unwrap(), 1);
        assert_eq!(page.input(input, "Market").unwrap(), 1);
        assert_eq!(page.tree().element(input).unwrap().observers().len(), 1);
        assert_eq!(
            page.model("shop").unwrap().get("name").unwrap(),
            &json!("Market")
        );
    }

    #[test]
    fn remove_element_forgets_subscribers() {
        let (mut page, _, title) = page();
        page.add_json_model("shop", json!({ "name": "Shop" })).unwrap();
        page.remove_element(title).unwrap();
        assert!(!page
            .model("shop")
            .unwrap()
            .property_subscribers()
            .contains(&title));
        page.set_property("shop", "name", json!("Closed")).unwrap();
    }
}
