//! Turns relative binding paths into absolute model paths.
//!
//! A binding inside a list region is relative to the item it sits in. The
//! item is identified structurally: the child of the region that contains the
//! element, by position. Regions nest, so resolution recurses outward until
//! it reaches a region that is not inside another region of the same model.
//!
//! Only regions bound to the same model count. An element that opts out of
//! list context always resolves to its raw path.

use vdb_core::{BindingKind, ElementId, ElementTree};

use crate::annotation;
use crate::error::ModelError;

/// Nearest ancestor (self excluded) whose list annotation binds `model`.
#[must_use]
pub fn enclosing_list(tree: &ElementTree, model: &str, id: ElementId) -> Option<ElementId> {
    tree.ancestors(id).find(|&ancestor| {
        tree.get(ancestor)
            .map(|e| e.annotation(BindingKind::List))
            .and_then(|raw| annotation::parse(raw).ok())
            .is_some_and(|bindings| bindings.iter().any(|b| b.model == model))
    })
}

/// Absolute path of the `index`-th binding of `kind` on `id`.
///
/// `index` counts over all bindings in the annotation, not just those of
/// `model`; the binding at `index` is expected to belong to `model`.
pub fn resolve(
    tree: &ElementTree,
    model: &str,
    id: ElementId,
    kind: BindingKind,
    index: usize,
) -> Result<String, ModelError> {
    let element = tree.element(id)?;
    let bindings = annotation::parse(element.annotation(kind))?;
    let binding = bindings
        .get(index)
        .filter(|b| b.model == model)
        .ok_or_else(|| ModelError::NotBound {
            model: model.to_owned(),
            element: id,
        })?;

    if element.ignores_list_context() {
        return Ok(binding.path.clone());
    }
    let Some(region) = enclosing_list(tree, model, id) else {
        return Ok(binding.path.clone());
    };

    let region_bindings = annotation::parse(tree.element(region)?.annotation(BindingKind::List))?;
    let region_index = annotation::indices_for(&region_bindings, model)
        .next()
        .ok_or_else(|| ModelError::NotBound {
            model: model.to_owned(),
            element: region,
        })?;
    let region_path = resolve(tree, model, region, BindingKind::List, region_index)?;
    let ordinal = tree
        .child_index_containing(region, id)
        .ok_or_else(|| ModelError::NotInListContext {
            model: model.to_owned(),
            element: id,
        })?;

    Ok(format!("{region_path}/{ordinal}/{}", binding.path))
}
