//! Model → element propagation.
//!
//! A sweep re-renders every attached property subscriber from the current
//! data. Paths were fixed at registration; the sweep only reads them. It is
//! a pure function of (data, derived paths): running it twice in a row
//! writes the same values twice.

use serde_json::Value;
use vdb_core::{BindingKind, ElementId, ElementTree};

use crate::annotation;
use crate::model::Model;
use crate::store;

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Bindings written to an element.
    pub written: usize,
    /// Bindings whose path was absent; these rendered as empty.
    pub missing: usize,
    /// Subscribers dropped because their element no longer exists.
    pub pruned: usize,
}

impl Model {
    /// Push current data to every property subscriber.
    pub fn update_subscribers(&mut self, tree: &mut ElementTree) -> SweepReport {
        let _span = tracing::debug_span!("sweep", model = %self.name).entered();
        let mut report = SweepReport {
            pruned: self.prune(tree),
            ..SweepReport::default()
        };

        for id in self.subscribers.property.clone() {
            if !tree.is_attached(id) {
                continue;
            }
            let raw = tree.get(id).and_then(|e| e.annotation(BindingKind::Property));
            let bindings = match annotation::parse(raw) {
                Ok(bindings) => bindings,
                Err(e) => {
                    tracing::warn!(model = %self.name, element = %id, error = %e, "skipping subscriber with invalid annotation");
                    continue;
                }
            };
            let Some(derived) = self.table.get(&id) else {
                continue;
            };

            let own = bindings.iter().filter(|b| b.model == self.name);
            for (binding, path) in own.zip(&derived.properties) {
                let value = match store::lookup(&self.data, path) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!(model = %self.name, element = %id, path = %path, "bound property not found");
                        report.missing += 1;
                        Value::String(String::new())
                    }
                };
                write_target(tree, id, binding.attribute.as_deref(), value);
                report.written += 1;
            }
        }

        tracing::debug!(
            model = %self.name,
            written = report.written,
            missing = report.missing,
            pruned = report.pruned,
            "subscribers updated"
        );
        report
    }

    /// Drop subscribers whose elements have been removed from the tree.
    fn prune(&mut self, tree: &ElementTree) -> usize {
        let dead: Vec<ElementId> = self
            .table
            .keys()
            .chain(&self.subscribers.list)
            .chain(&self.subscribers.property)
            .copied()
            .filter(|&id| !tree.exists(id))
            .collect();
        if dead.is_empty() {
            return 0;
        }
        let before = self.subscribers.list.len() + self.subscribers.property.len();
        self.forget(&dead);
        before - (self.subscribers.list.len() + self.subscribers.property.len())
    }
}

fn write_target(tree: &mut ElementTree, id: ElementId, attribute: Option<&str>, value: Value) {
    // `id` was checked to be attached, so these writes cannot fail.
    let _ = match attribute {
        Some(attribute) => tree.set_property(id, attribute, value),
        None => tree.set_text(id, store::render_text(&value)),
    };
}
