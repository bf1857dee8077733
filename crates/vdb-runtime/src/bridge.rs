//! Element → model write-back.
//!
//! Input-like elements get one change observer per derived property path.
//! Observers are replaced, never stacked, so re-registering an element does
//! not make a change fire twice. A fired change carries the element's raw
//! value (always a string) to every observer's model and path.

use serde_json::Value;
use vdb_core::{ChangeEvent, ElementId, ElementTree};

use crate::error::ModelError;
use crate::model::Model;

/// Replace `model`'s observers on `id` with one per path.
///
/// Elements that do not accept input are left alone. Returns the number of
/// observers attached.
pub fn attach(tree: &mut ElementTree, model: &str, id: ElementId, paths: &[String]) -> usize {
    let Some(element) = tree.get_mut(id) else {
        return 0;
    };
    if !element.is_input_like() {
        return 0;
    }
    element.replace_observers(model, paths.iter().map(String::as_str));
    tracing::trace!(model = %model, element = %id, observers = paths.len(), "write-back attached");
    paths.len()
}

impl Model {
    /// Apply the observers of `event` that belong to this model.
    ///
    /// Returns the number of writes made.
    pub fn apply_change(
        &mut self,
        tree: &mut ElementTree,
        event: &ChangeEvent,
    ) -> Result<usize, ModelError> {
        let paths: Vec<&str> = event
            .observers
            .iter()
            .filter(|o| o.model == self.name)
            .map(|o| o.path.as_str())
            .collect();
        for path in &paths {
            self.set_property(tree, path, Value::String(event.value.clone()))?;
        }
        Ok(paths.len())
    }
}
