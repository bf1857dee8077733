#![forbid(unsafe_code)]

//! List regions: expanding a template per array item, and appending items.
//!
//! A region is an element with a list binding. Its first child is the
//! template. Materializing the region appends one deep clone of the template
//! per array item, then detaches the template and keeps it aside so an empty
//! region can still grow later.
//!
//! Paths of nested regions inside a clone are carried over from the
//! template's entries and re-anchored under the clone's item index (see
//! [`path::rebase`]). Property elements inside clones are registered by the
//! caller afterwards, either by a property pass over the tree or, for
//! appends, directly.
//!
//! # Invariants
//!
//! 1. After materializing a region over an array of N items it has exactly
//!    N children, in array order.
//! 2. A region is materialized at most once; later calls leave it as is.
//! 3. Templates never appear in subscriber sequences after detaching.
//! 4. A kept template is never expanded, so regions nested inside it hold
//!    exactly their own template child. Appends rebuild nested regions from
//!    it, which keeps invariant 1 at every depth.
//!
//! # Failure Modes
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | Region has no child | [`ModelError::MalformedRegion`]; logged, other regions continue |
//! | Bound path absent | Treated as empty; logged |
//! | Bound path not an array | Treated as empty; logged |
//! | Append to a non-array | [`ModelError::NotAList`], nothing changes |

use std::collections::HashMap;

use serde_json::Value;
use vdb_core::{BindingKind, ElementId, ElementTree};

use crate::annotation;
use crate::error::ModelError;
use crate::model::{DerivedBindings, Model};
use crate::path;
use crate::resolve;
use crate::store;

/// Result of [`Model::append_list_item`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppendedItem<'a> {
    /// Index of the new item in the array.
    pub index: usize,
    /// New item element in each region bound to the list, in region order.
    pub elements: Vec<ElementId>,
    /// The model data after the append.
    pub data: &'a Value,
}

impl Model {
    /// Expand the region at `region` from its template.
    ///
    /// Returns the number of items materialized. A region that is already
    /// materialized is left alone and reports its current item count.
    pub fn materialize(
        &mut self,
        tree: &mut ElementTree,
        region: ElementId,
    ) -> Result<usize, ModelError> {
        let _span = tracing::debug_span!("materialize", model = %self.name, element = %region).entered();
        let Some(list_path) = self.table.get(&region).and_then(|d| d.list.clone()) else {
            return Err(ModelError::NotBound {
                model: self.name.clone(),
                element: region,
            });
        };
        if self.is_list_root(region) {
            tracing::debug!(model = %self.name, element = %region, "region already materialized");
            return Ok(tree.children(region).len());
        }
        let Some(template) = tree.first_child(region) else {
            tracing::error!(model = %self.name, element = %region, path = %list_path, "list binding has no template child");
            return Err(ModelError::MalformedRegion {
                model: self.name.clone(),
                element: region,
            });
        };

        if let Some(derived) = self.table.get_mut(&region) {
            derived.list_root = true;
        }

        self.register_template_regions(tree, template);

        let len = self.array_len(&list_path);
        for index in 0..len {
            let (copy, pairs) = tree.clone_subtree(template)?;
            tree.append_child(region, copy)?;
            self.adopt_regions(tree, region, &list_path, index, &pairs);
        }

        tree.detach(template)?;
        self.unsubscribe(&tree.walk(template));
        self.templates.insert(region, template);
        tracing::debug!(model = %self.name, element = %region, path = %list_path, items = len, "region materialized");
        Ok(len)
    }

    /// Materialize and log instead of failing.
    pub(crate) fn materialize_logged(&mut self, tree: &mut ElementTree, region: ElementId) {
        if let Err(e) = self.materialize(tree, region) {
            tracing::warn!(model = %self.name, element = %region, error = %e, "region not materialized");
        }
    }

    /// Give every region inside `template` its path, resolved while the
    /// template still sits at item position 0.
    fn register_template_regions(&mut self, tree: &mut ElementTree, template: ElementId) {
        for id in tree.walk(template) {
            if tree.get(id).and_then(|e| e.annotation(BindingKind::List)).is_none() {
                continue;
            }
            if let Err(e) = self.register_element(tree, id, BindingKind::List) {
                tracing::warn!(model = %self.name, element = %id, error = %e, "skipping nested list binding");
            }
        }
    }

    fn array_len(&self, list_path: &str) -> usize {
        match store::lookup(&self.data, list_path) {
            Some(Value::Array(items)) => items.len(),
            Some(_) => {
                tracing::warn!(model = %self.name, path = %list_path, "list binding does not point at an array");
                0
            }
            None => {
                tracing::warn!(model = %self.name, path = %list_path, "list binding path not found");
                0
            }
        }
    }

    /// Carry nested region paths from `pairs` originals onto their copies,
    /// re-anchored under `index`. Regions directly inside `region` are then
    /// subscribed and materialized.
    fn adopt_regions(
        &mut self,
        tree: &mut ElementTree,
        region: ElementId,
        list_path: &str,
        index: usize,
        pairs: &[(ElementId, ElementId)],
    ) {
        let mut direct = Vec::new();
        for &(original, copy) in pairs {
            let Some(source) = self.table.get(&original).and_then(|d| d.list.clone()) else {
                continue;
            };
            let path = self.reanchor(tree, copy, &source, list_path, index);
            self.table.insert(
                copy,
                DerivedBindings {
                    list: Some(path),
                    ..DerivedBindings::default()
                },
            );
            if resolve::enclosing_list(tree, &self.name, copy) == Some(region) {
                direct.push(copy);
            }
        }
        for nested in direct {
            self.subscribers.insert(BindingKind::List, nested);
            self.materialize_logged(tree, nested);
        }
    }

    fn reanchor(
        &self,
        tree: &ElementTree,
        id: ElementId,
        path: &str,
        list_path: &str,
        index: usize,
    ) -> String {
        if tree.get(id).is_some_and(|e| e.ignores_list_context()) {
            return path.to_owned();
        }
        path::rebase(path, list_path, index).unwrap_or_else(|| {
            tracing::warn!(model = %self.name, element = %id, path = %path, list = %list_path, "path too short to re-anchor");
            path.to_owned()
        })
    }

    /// Append `value` to the array at `path` and grow every region bound to it.
    ///
    /// The new item in each region is cloned from the region's last item, or
    /// from its kept template when the region is empty.
    pub fn append_list_item(
        &mut self,
        tree: &mut ElementTree,
        path: &str,
        value: Value,
    ) -> Result<AppendedItem<'_>, ModelError> {
        let _span = tracing::debug_span!("append", model = %self.name, path = %path).entered();
        let index = match store::lookup(&self.data, path) {
            Some(Value::Array(items)) => items.len(),
            Some(_) => {
                return Err(ModelError::NotAList {
                    model: self.name.clone(),
                    path: path.to_owned(),
                });
            }
            None => {
                return Err(ModelError::PathNotFound {
                    model: self.name.clone(),
                    path: path.to_owned(),
                });
            }
        };
        self.set(&path::child(path, index), value)?;

        let regions: Vec<ElementId> = self
            .subscribers
            .list
            .iter()
            .copied()
            .filter(|&id| {
                tree.is_attached(id)
                    && self.table.get(&id).and_then(|d| d.list.as_deref()) == Some(path)
            })
            .collect();

        let mut elements = Vec::with_capacity(regions.len());
        for region in regions {
            match self.grow_region(tree, region, path, index) {
                Ok(element) => elements.push(element),
                Err(e) => {
                    tracing::error!(model = %self.name, element = %region, error = %e, "could not append list item");
                }
            }
        }

        self.update_subscribers(tree);
        Ok(AppendedItem {
            index,
            elements,
            data: &self.data,
        })
    }

    fn grow_region(
        &mut self,
        tree: &mut ElementTree,
        region: ElementId,
        list_path: &str,
        index: usize,
    ) -> Result<ElementId, ModelError> {
        let basis = match tree.last_child(region) {
            Some(last) => last,
            None => *self
                .templates
                .get(&region)
                .ok_or_else(|| ModelError::MalformedRegion {
                    model: self.name.clone(),
                    element: region,
                })?,
        };
        if tree.children(region).len() != index {
            tracing::warn!(
                model = %self.name,
                element = %region,
                items = tree.children(region).len(),
                index,
                "region out of step with its data"
            );
        }

        let (copy, pairs) = tree.clone_subtree(basis)?;
        tree.append_child(region, copy)?;

        // Nested regions: carry paths over, then rebuild from their templates.
        let mut direct = Vec::new();
        for &(original, cloned) in &pairs {
            let Some(source) = self.table.get(&original).and_then(|d| d.list.clone()) else {
                continue;
            };
            let nested_path = self.reanchor(tree, cloned, &source, list_path, index);
            self.table.insert(
                cloned,
                DerivedBindings {
                    list: Some(nested_path),
                    ..DerivedBindings::default()
                },
            );
            if resolve::enclosing_list(tree, &self.name, cloned) == Some(region) {
                direct.push((original, cloned));
            }
        }
        for (original, nested) in direct {
            self.reset_region(tree, original, nested)?;
            self.subscribers.insert(BindingKind::List, nested);
            self.materialize_logged(tree, nested);
        }

        // Property elements: carried-over paths where the source had them,
        // resolved from the tree otherwise.
        let sources: HashMap<ElementId, ElementId> = pairs.iter().map(|&(o, c)| (c, o)).collect();
        for id in tree.walk(copy) {
            let has_binding = tree
                .get(id)
                .map(|e| e.annotation(BindingKind::Property))
                .and_then(|raw| annotation::parse(raw).ok())
                .is_some_and(|b| b.iter().any(|b| b.model == self.name));
            if !has_binding {
                continue;
            }
            let carried = sources
                .get(&id)
                .and_then(|original| self.table.get(original))
                .filter(|d| !d.properties.is_empty())
                .map(|d| d.properties.clone());
            match carried {
                Some(paths) => {
                    let paths = paths
                        .iter()
                        .map(|p| self.reanchor(tree, id, p, list_path, index))
                        .collect();
                    self.set_property_paths(tree, id, paths);
                    self.subscribers.insert(BindingKind::Property, id);
                }
                None => {
                    self.register_element(tree, id, BindingKind::Property)?;
                }
            }
        }

        tracing::debug!(model = %self.name, element = %region, index, "list item appended");
        Ok(copy)
    }

    /// Leave `nested` holding a single unexpanded template child, ready to
    /// materialize.
    ///
    /// `original` is the region `nested` was cloned from. When `original` was
    /// materialized, its kept template replaces everything the clone carried,
    /// so regions further down start out unexpanded as well. Otherwise the
    /// clone's first child already is a template and stays.
    fn reset_region(
        &mut self,
        tree: &mut ElementTree,
        original: ElementId,
        nested: ElementId,
    ) -> Result<(), ModelError> {
        let template = self.templates.get(&original).copied();
        let keep = usize::from(template.is_none());
        for stale in tree.children(nested).iter().skip(keep).copied().collect::<Vec<_>>() {
            let removed = tree.remove(stale)?;
            self.forget(&removed);
        }
        if let Some(template) = template {
            let (copy, _) = tree.clone_subtree(template)?;
            tree.append_child(nested, copy)?;
        }
        Ok(())
    }
}
