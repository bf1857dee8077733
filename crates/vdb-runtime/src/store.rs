//! Path reads and writes on a JSON data tree.
//!
//! # Invariants
//!
//! 1. [`lookup`] never allocates and never mutates.
//! 2. [`assign`] either writes exactly one value or changes nothing.
//! 3. Writing index `len` of an array appends; any larger index fails.
//!
//! # Failure Modes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Missing key, out-of-range index, or `null` on read | `None` |
//! | Intermediate segment missing or scalar on write | [`WriteFailure::MissingContainer`] |
//! | Array index > len on write | [`WriteFailure::IndexOutOfBounds`] |

use serde_json::Value;

use crate::path;

/// Why a write did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    MissingContainer { segment: String },
    IndexOutOfBounds { index: usize, len: usize },
}

/// Read the value at `path`. `null` counts as absent.
#[must_use]
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path::segments(path) {
        current = step(current, segment)?;
    }
    (!current.is_null()).then_some(current)
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Write `value` at `path`, replacing whatever was there.
///
/// The empty path replaces the whole tree. Only the final segment may be
/// missing; every intermediate container must already exist.
pub fn assign(root: &mut Value, path: &str, value: Value) -> Result<(), WriteFailure> {
    let parts = path::segments(path);
    let Some((last, parents)) = parts.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        current = step_mut(current, segment).ok_or_else(|| WriteFailure::MissingContainer {
            segment: (*segment).to_owned(),
        })?;
    }

    match current {
        Value::Object(map) => {
            map.insert((*last).to_owned(), value);
            Ok(())
        }
        Value::Array(items) => {
            let Ok(index) = last.parse::<usize>() else {
                return Err(WriteFailure::MissingContainer {
                    segment: (*last).to_owned(),
                });
            };
            let len = items.len();
            if index < len {
                items[index] = value;
                Ok(())
            } else if index == len {
                items.push(value);
                Ok(())
            } else {
                Err(WriteFailure::IndexOutOfBounds { index, len })
            }
        }
        _ => Err(WriteFailure::MissingContainer {
            segment: parents.last().map_or_else(String::new, |s| (*s).to_owned()),
        }),
    }
}

/// Text an element shows for a bound value.
///
/// Strings are shown as-is; `null` is empty; anything else is its JSON text.
#[must_use]
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
