#![forbid(unsafe_code)]

//! Element records stored in the [`ElementTree`](crate::tree::ElementTree).
//!
//! An [`Element`] is the engine's view of one UI node: a tag, a text slot, a
//! bag of named property slots, and two independent annotation slots (one per
//! [`BindingKind`]). Change observers registered by the two-way bridge live on
//! the element as plain data; they are never copied by a deep clone.

use core::fmt;
use std::collections::BTreeMap;

use serde_json::Value;

/// Name of the property slot holding an input element's current value.
pub const VALUE_PROPERTY: &str = "value";

/// Which annotation slot a binding is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
    /// The element repeats its template child once per array item.
    List,
    /// The element renders a single value into its text or a property slot.
    Property,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Property => write!(f, "property"),
        }
    }
}

/// A write-back registration: a change on the element writes its value into
/// `model` at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeObserver {
    pub model: String,
    pub path: String,
}

impl ChangeObserver {
    #[must_use]
    pub fn new(model: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            path: path.into(),
        }
    }
}

/// One node of the host render tree.
///
/// # Example
///
/// ```
/// use vdb_core::element::{BindingKind, Element};
///
/// let item = Element::new("li")
///     .bind_property("supermarket>name")
///     .with_text("placeholder");
/// assert_eq!(item.annotation(BindingKind::Property), Some("supermarket>name"));
/// assert_eq!(item.text(), "placeholder");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    text: String,
    properties: BTreeMap<String, Value>,
    list_annotation: Option<String>,
    property_annotation: Option<String>,
    ignore_list_context: bool,
    observers: Vec<ChangeObserver>,
}

impl Element {
    /// Create an element with the given tag and no annotations.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the list annotation (builder form).
    #[must_use]
    pub fn bind_list(mut self, raw: impl Into<String>) -> Self {
        self.list_annotation = Some(raw.into());
        self
    }

    /// Set the property annotation (builder form).
    #[must_use]
    pub fn bind_property(mut self, raw: impl Into<String>) -> Self {
        self.property_annotation = Some(raw.into());
        self
    }

    /// Opt out of inheriting an enclosing list region's index.
    #[must_use]
    pub fn ignore_list_context(mut self) -> Self {
        self.ignore_list_context = true;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Current value of an input-like element, as the raw string the user typed.
    ///
    /// Non-string values are rendered as JSON text; an unset value is empty.
    #[must_use]
    pub fn value(&self) -> String {
        match self.properties.get(VALUE_PROPERTY) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Raw annotation for a binding kind, if any.
    #[must_use]
    pub fn annotation(&self, kind: BindingKind) -> Option<&str> {
        match kind {
            BindingKind::List => self.list_annotation.as_deref(),
            BindingKind::Property => self.property_annotation.as_deref(),
        }
    }

    pub fn set_annotation(&mut self, kind: BindingKind, raw: Option<String>) {
        match kind {
            BindingKind::List => self.list_annotation = raw,
            BindingKind::Property => self.property_annotation = raw,
        }
    }

    #[must_use]
    pub fn ignores_list_context(&self) -> bool {
        self.ignore_list_context
    }

    /// Whether the element accepts user input (text input, text area, date picker).
    ///
    /// Matching is by tag substring, so custom widget tags such as
    /// `ui5-input` or `ui5-date-picker` qualify.
    #[must_use]
    pub fn is_input_like(&self) -> bool {
        let tag = self.tag.to_ascii_lowercase();
        tag.contains("input") || tag.contains("textarea") || tag.contains("date-picker")
    }

    /// Registered change observers, in registration order.
    #[must_use]
    pub fn observers(&self) -> &[ChangeObserver] {
        &self.observers
    }

    /// Add an observer unless an identical one is already present.
    ///
    /// Returns `true` if the observer was added.
    pub fn add_observer(&mut self, observer: ChangeObserver) -> bool {
        if self.observers.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Replace every observer belonging to `model` with observers for `paths`.
    pub fn replace_observers<'a>(
        &mut self,
        model: &str,
        paths: impl IntoIterator<Item = &'a str>,
    ) {
        self.observers.retain(|o| o.model != model);
        for path in paths {
            self.add_observer(ChangeObserver::new(model, path));
        }
    }

    /// Copy of this element without its observers (event listeners are not
    /// part of a deep clone).
    #[must_use]
    pub(crate) fn clone_detached(&self) -> Self {
        Self {
            observers: Vec::new(),
            ..self.clone()
        }
    }
}
