#![forbid(unsafe_code)]

//! A named data tree and the elements subscribed to it.
//!
//! A [`Model`] owns its data and, per bound element, the absolute paths that
//! element's bindings resolved to ([`DerivedBindings`]). The element tree is
//! passed in by the caller for every operation that reads or writes elements,
//! so models never hold references into the tree.
//!
//! # Invariants
//!
//! 1. Each element appears at most once in each subscriber sequence.
//! 2. `DerivedBindings::properties` lines up, in order, with this model's
//!    entries in the element's property annotation.
//! 3. Subscriber sequences contain only elements that were attached when
//!    registered; list templates are dropped from them once detached.
//! 4. Re-registering an element recomputes its paths in place.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unparsable annotation | Bad annotation text | Logged, element skipped |
//! | Read misses | Path absent or `null` | [`ModelError::PathNotFound`] |
//! | Write fails | Missing container or index past end | Error returned, data unchanged |
//! | Element removed from tree | Host teardown | Pruned on the next sweep |

use std::collections::HashMap;

use serde_json::Value;
use vdb_core::{BindingKind, ElementId, ElementTree};

use crate::annotation;
use crate::bridge;
use crate::error::ModelError;
use crate::path;
use crate::resolve;
use crate::store::{self, WriteFailure};

/// Absolute paths one element is bound to in one model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedBindings {
    /// Path of the element's list binding, if it is a list region.
    pub list: Option<String>,
    /// Paths of this model's property bindings, in annotation order.
    pub properties: Vec<String>,
    /// Set once the region has been materialized.
    pub list_root: bool,
}

impl DerivedBindings {
    /// All paths joined with `+`, list path first.
    #[must_use]
    pub fn joined(&self) -> String {
        self.list
            .iter()
            .chain(&self.properties)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// The path used to locate the list item an element belongs to.
    #[must_use]
    pub fn first_path(&self) -> Option<&str> {
        self.properties
            .first()
            .or(self.list.as_ref())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Subscribers {
    pub(crate) list: Vec<ElementId>,
    pub(crate) property: Vec<ElementId>,
}

impl Subscribers {
    pub(crate) fn of_kind(&mut self, kind: BindingKind) -> &mut Vec<ElementId> {
        match kind {
            BindingKind::List => &mut self.list,
            BindingKind::Property => &mut self.property,
        }
    }

    pub(crate) fn insert(&mut self, kind: BindingKind, id: ElementId) {
        let ids = self.of_kind(kind);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(ElementId) -> bool) {
        self.list.retain(|&id| keep(id));
        self.property.retain(|&id| keep(id));
    }
}

/// A named JSON model bound to elements of an [`ElementTree`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use vdb_core::{Element, ElementTree};
/// use vdb_runtime::Model;
///
/// let mut tree = ElementTree::new();
/// let root = tree.root();
/// let title = tree
///     .append(root, Element::new("h1").bind_property("shop>name"))
///     .unwrap();
///
/// let mut shop = Model::json("shop", json!({ "name": "Corner Shop" }), &mut tree).unwrap();
/// assert_eq!(tree.element(title).unwrap().text(), "Corner Shop");
///
/// shop.set_property(&mut tree, "name", json!("Night Market")).unwrap();
/// assert_eq!(tree.element(title).unwrap().text(), "Night Market");
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) data: Value,
    pub(crate) subscribers: Subscribers,
    pub(crate) table: HashMap<ElementId, DerivedBindings>,
    /// Detached template of each materialized region.
    pub(crate) templates: HashMap<ElementId, ElementId>,
}

impl Model {
    /// Create a model without touching any element.
    #[must_use]
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            subscribers: Subscribers::default(),
            table: HashMap::new(),
            templates: HashMap::new(),
        }
    }

    /// Create a model and bind it to `tree`: list regions first, then
    /// property bindings.
    pub fn json(
        name: impl Into<String>,
        data: Value,
        tree: &mut ElementTree,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new(name, data);
        let _span = tracing::debug_span!("model_init", model = %model.name).entered();
        model.initialize_subscribers(tree, BindingKind::List)?;
        model.initialize_subscribers(tree, BindingKind::Property)?;
        Ok(model)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Swap in new data without updating elements. Returns the old data.
    pub fn replace_data(&mut self, data: Value) -> Value {
        core::mem::replace(&mut self.data, data)
    }

    #[must_use]
    pub fn list_subscribers(&self) -> &[ElementId] {
        &self.subscribers.list
    }

    #[must_use]
    pub fn property_subscribers(&self) -> &[ElementId] {
        &self.subscribers.property
    }

    #[must_use]
    pub fn derived(&self, id: ElementId) -> Option<&DerivedBindings> {
        self.table.get(&id)
    }

    /// Debug view of an element's paths: `+`-joined, list path first.
    #[must_use]
    pub fn bound_paths(&self, id: ElementId) -> Option<String> {
        self.table
            .get(&id)
            .map(DerivedBindings::joined)
            .filter(|joined| !joined.is_empty())
    }

    // -----------------------------------------------------------------------
    // Data access
    // -----------------------------------------------------------------------

    /// Read the value at `path`. The empty path is the whole tree.
    pub fn get(&self, path: &str) -> Result<&Value, ModelError> {
        store::lookup(&self.data, path).ok_or_else(|| ModelError::PathNotFound {
            model: self.name.clone(),
            path: path.to_owned(),
        })
    }

    /// Write `value` at `path` without updating elements.
    pub fn set(&mut self, path: &str, value: Value) -> Result<&Value, ModelError> {
        store::assign(&mut self.data, path, value).map_err(|failure| match failure {
            WriteFailure::MissingContainer { segment } => ModelError::MissingContainer {
                model: self.name.clone(),
                path: path.to_owned(),
                segment,
            },
            WriteFailure::IndexOutOfBounds { index, len } => ModelError::IndexOutOfBounds {
                model: self.name.clone(),
                path: path.to_owned(),
                index,
                len,
            },
        })?;
        Ok(&self.data)
    }

    /// Write `value` at `path`, then push the data to every subscriber.
    pub fn set_property(
        &mut self,
        tree: &mut ElementTree,
        path: &str,
        value: Value,
    ) -> Result<&Value, ModelError> {
        self.set(path, value)?;
        tracing::debug!(model = %self.name, path = %path, "property set");
        self.update_subscribers(tree);
        Ok(&self.data)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register every attached element that has a binding of `kind` for this
    /// model, then sweep. For lists, each new region is materialized.
    ///
    /// Returns the number of elements registered.
    pub fn initialize_subscribers(
        &mut self,
        tree: &mut ElementTree,
        kind: BindingKind,
    ) -> Result<usize, ModelError> {
        let mut registered = 0;
        for id in tree.document_order() {
            // Earlier materializations may have detached this element.
            if !tree.is_attached(id) || tree.get(id).and_then(|e| e.annotation(kind)).is_none() {
                continue;
            }
            match self.register_element(tree, id, kind) {
                Ok(true) => {
                    registered += 1;
                    if kind == BindingKind::List && !self.is_list_root(id) {
                        self.materialize_logged(tree, id);
                    }
                }
                Ok(false) => {}
                Err(ModelError::Annotation(e)) => {
                    tracing::warn!(model = %self.name, element = %id, kind = %kind, error = %e, "skipping element with invalid annotation");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(model = %self.name, kind = %kind, registered, "subscribers initialized");
        self.update_subscribers(tree);
        Ok(registered)
    }

    /// Register one element for `kind`, computing its absolute paths.
    ///
    /// Returns `Ok(false)` if the annotation has no binding for this model.
    /// Registering again recomputes the paths in place.
    pub fn register_element(
        &mut self,
        tree: &mut ElementTree,
        id: ElementId,
        kind: BindingKind,
    ) -> Result<bool, ModelError> {
        let bindings = annotation::parse(tree.element(id)?.annotation(kind))?;
        let indices: Vec<usize> = annotation::indices_for(&bindings, &self.name).collect();
        if indices.is_empty() {
            return Ok(false);
        }

        match kind {
            BindingKind::List => {
                if indices.len() > 1 {
                    tracing::warn!(model = %self.name, element = %id, "only the first list binding per model is used");
                }
                let path = resolve::resolve(tree, &self.name, id, kind, indices[0])?;
                self.table.entry(id).or_default().list = Some(path);
            }
            BindingKind::Property => {
                let paths = indices
                    .iter()
                    .map(|&i| resolve::resolve(tree, &self.name, id, kind, i))
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_property_paths(tree, id, paths);
            }
        }
        self.subscribers.insert(kind, id);
        Ok(true)
    }

    /// Record property paths for `id` and refresh its write-back observers.
    pub(crate) fn set_property_paths(
        &mut self,
        tree: &mut ElementTree,
        id: ElementId,
        paths: Vec<String>,
    ) {
        bridge::attach(tree, &self.name, id, &paths);
        self.table.entry(id).or_default().properties = paths;
    }

    /// Stop tracking `id` and drop its write-back observers for this model.
    pub fn unregister(&mut self, tree: &mut ElementTree, id: ElementId) {
        self.forget(&[id]);
        if let Some(element) = tree.get_mut(id) {
            element.replace_observers(&self.name, core::iter::empty());
        }
    }

    /// Drop every trace of `ids` from the subscriber sequences and tables.
    pub fn forget(&mut self, ids: &[ElementId]) {
        self.subscribers.retain(|id| !ids.contains(&id));
        for id in ids {
            self.table.remove(id);
            self.templates.remove(id);
        }
    }

    /// Drop `ids` from the subscriber sequences only; their paths are kept.
    pub(crate) fn unsubscribe(&mut self, ids: &[ElementId]) {
        self.subscribers.retain(|id| !ids.contains(&id));
    }

    pub(crate) fn is_list_root(&self, id: ElementId) -> bool {
        self.table.get(&id).is_some_and(|d| d.list_root)
    }

    /// Bind `id` to the absolute `path` of this model, replacing its existing
    /// property bindings for this model. Bindings of other models are kept.
    pub fn bind_element_and_property(
        &mut self,
        tree: &mut ElementTree,
        id: ElementId,
        path: &str,
    ) -> Result<&Value, ModelError> {
        let element = tree.element_mut(id)?;
        let mut bindings = annotation::parse(element.annotation(BindingKind::Property))?;
        bindings.retain(|b| b.model != self.name);
        bindings.push(annotation::Binding::new(self.name.as_str(), path));
        element.set_annotation(BindingKind::Property, Some(annotation::format(&bindings)));

        self.set_property_paths(tree, id, vec![path.to_owned()]);
        self.subscribers.insert(BindingKind::Property, id);
        tracing::debug!(model = %self.name, element = %id, path = %path, "element bound");
        self.update_subscribers(tree);
        Ok(&self.data)
    }

    /// Data of the list item that `id` belongs to.
    ///
    /// Searches `id` and its descendants, then each ancestor's subtree in
    /// turn, for the first element with derived paths, and strips that path
    /// back to its item index.
    pub fn bound_item(&self, tree: &ElementTree, id: ElementId) -> Result<&Value, ModelError> {
        let mut scope = Some(id);
        let mut found = None;
        while let Some(current) = scope {
            found = tree
                .walk(current)
                .into_iter()
                .find_map(|candidate| self.table.get(&candidate)?.first_path());
            if found.is_some() {
                break;
            }
            scope = tree.parent(current);
        }

        let not_in_list = || ModelError::NotInListContext {
            model: self.name.clone(),
            element: id,
        };
        let Some(item) = found.and_then(path::item_prefix) else {
            tracing::error!(model = %self.name, element = %id, "element is not inside a list binding");
            return Err(not_in_list());
        };
        self.get(item)
    }
}
