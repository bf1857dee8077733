#![forbid(unsafe_code)]

//! Arena-backed element tree standing in for the host render tree.
//!
//! The binding engine never owns elements; it refers to them by
//! [`ElementId`] and asks the tree for structure (parents, children,
//! containment) and for slot reads and writes.
//!
//! # Invariants
//!
//! 1. **Ids are never reused**: removing a subtree leaves tombstones, so a
//!    stale id can be detected with [`ElementTree::exists`].
//! 2. **Single parent**: an element is a child of at most one parent;
//!    appending an attached element moves it.
//! 3. **No cycles**: an element cannot be appended into its own subtree.
//! 4. **Detached subtrees are inert**: they keep their structure but are not
//!    reachable from the root and are excluded from [`ElementTree::document_order`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown id | Element removed or never created | `TreeError::UnknownElement` |
//! | Cycle | Appending an ancestor into its descendant | `TreeError::Cycle` |
//! | Root mutation | Detaching/removing the root | `TreeError::Root` |

use core::fmt;

use serde_json::Value;

use crate::element::{ChangeObserver, Element, VALUE_PROPERTY};

/// Stable identity of an element within one [`ElementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from structural tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The id does not refer to a live element.
    UnknownElement(ElementId),
    /// The operation would make an element its own ancestor.
    Cycle { parent: ElementId, child: ElementId },
    /// The root element cannot be moved or removed.
    Root,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "unknown element {id}"),
            Self::Cycle { parent, child } => {
                write!(f, "cannot append {child} into its own subtree at {parent}")
            }
            Self::Root => write!(f, "the root element cannot be detached or removed"),
        }
    }
}

impl std::error::Error for TreeError {}

/// A value-change notification produced by [`ElementTree::fire_change`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub element: ElementId,
    /// The element's current raw value.
    pub value: String,
    /// Observers to notify, in registration order.
    pub observers: Vec<ChangeObserver>,
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// The element arena. Slot 0 is the root.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<Option<Node>>,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Create a tree containing only a `body` root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Element::new("body"))
    }

    #[must_use]
    pub fn with_root(root: Element) -> Self {
        Self {
            nodes: vec![Some(Node {
                element: root,
                parent: None,
                children: Vec::new(),
            })],
        }
    }

    #[must_use]
    pub const fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Number of live elements, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn exists(&self, id: ElementId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.node(id).map(|n| &n.element)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.node_mut(id).map(|n| &mut n.element)
    }

    /// Look up an element, failing with [`TreeError::UnknownElement`].
    pub fn element(&self, id: ElementId) -> Result<&Element, TreeError> {
        self.get(id).ok_or(TreeError::UnknownElement(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, TreeError> {
        self.get_mut(id).ok_or(TreeError::UnknownElement(id))
    }

    /// Create a detached element.
    pub fn create(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Some(Node {
            element,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    /// Create an element and append it under `parent`.
    pub fn append(&mut self, parent: ElementId, element: Element) -> Result<ElementId, TreeError> {
        if !self.exists(parent) {
            return Err(TreeError::UnknownElement(parent));
        }
        let id = self.create(element);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        if !self.exists(parent) {
            return Err(TreeError::UnknownElement(parent));
        }
        if !self.exists(child) {
            return Err(TreeError::UnknownElement(child));
        }
        if child == self.root() {
            return Err(TreeError::Root);
        }
        if self.contains(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        self.unlink(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Detach `id` from its parent, keeping the subtree alive.
    pub fn detach(&mut self, id: ElementId) -> Result<(), TreeError> {
        if id == self.root() {
            return Err(TreeError::Root);
        }
        if !self.exists(id) {
            return Err(TreeError::UnknownElement(id));
        }
        self.unlink(id);
        Ok(())
    }

    /// Delete `id` and its whole subtree. Returns the removed ids in document order.
    pub fn remove(&mut self, id: ElementId) -> Result<Vec<ElementId>, TreeError> {
        self.detach(id)?;
        let removed = self.walk(id);
        #[cfg(feature = "tracing")]
        tracing::debug!(element = %id, count = removed.len(), "subtree removed");
        for &gone in &removed {
            if let Some(slot) = self.nodes.get_mut(gone.index()) {
                *slot = None;
            }
        }
        Ok(removed)
    }

    /// Deep-clone the subtree rooted at `id` into a new detached subtree.
    ///
    /// Returns the new root and the `(original, copy)` pairs in document
    /// order. Observers are not copied.
    pub fn clone_subtree(
        &mut self,
        id: ElementId,
    ) -> Result<(ElementId, Vec<(ElementId, ElementId)>), TreeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("clone_subtree", element = %id).entered();

        let source = self.element(id)?.clone_detached();
        let copy = self.create(source);
        let mut pairs = vec![(id, copy)];
        let mut stack = vec![(id, copy)];
        while let Some((original, cloned)) = stack.pop() {
            let children = self.children(original).to_vec();
            let mut copies = Vec::with_capacity(children.len());
            for child in children {
                let element = self.element(child)?.clone_detached();
                let child_copy = self.create(element);
                self.append_child(cloned, child_copy)?;
                copies.push((child, child_copy));
            }
            stack.extend(copies.into_iter().rev());
        }
        // `stack` pops depth-first; rebuild pairs in document order.
        pairs.extend(
            self.descendants(copy)
                .into_iter()
                .zip(self.descendants(id))
                .map(|(c, o)| (o, c)),
        );
        Ok((copy, pairs))
    }

    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Direct children in order; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.children(id).first().copied()
    }

    #[must_use]
    pub fn last_child(&self, id: ElementId) -> Option<ElementId> {
        self.children(id).last().copied()
    }

    /// Iterate over the ancestors of `id`, nearest first (self excluded).
    #[must_use]
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    #[must_use]
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Position among `ancestor`'s direct children of the child containing `node`.
    #[must_use]
    pub fn child_index_containing(&self, ancestor: ElementId, node: ElementId) -> Option<usize> {
        self.children(ancestor)
            .iter()
            .position(|&child| self.contains(child, node))
    }

    /// Whether `id` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.exists(id) && self.contains(self.root(), id)
    }

    /// `id` followed by all its descendants, in document order.
    #[must_use]
    pub fn walk(&self, id: ElementId) -> Vec<ElementId> {
        if !self.exists(id) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendants of `id` in document order (self excluded).
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut all = self.walk(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Every attached element in document order.
    #[must_use]
    pub fn document_order(&self) -> Vec<ElementId> {
        self.walk(self.root())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), TreeError> {
        self.element_mut(id)?.set_text(text);
        Ok(())
    }

    pub fn set_property(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        value: Value,
    ) -> Result<(), TreeError> {
        self.element_mut(id)?.set_property(name, value);
        Ok(())
    }

    /// Set the raw value of an input-like element without firing a change.
    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) -> Result<(), TreeError> {
        self.set_property(id, VALUE_PROPERTY, Value::String(value.into()))
    }

    /// Snapshot the element's value and observers for dispatch.
    ///
    /// The tree does not call back into models; the caller routes each
    /// observer to the model it names.
    pub fn fire_change(&self, id: ElementId) -> Result<ChangeEvent, TreeError> {
        let element = self.element(id)?;
        Ok(ChangeEvent {
            element: id,
            value: element.value(),
            observers: element.observers().to_vec(),
        })
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn unlink(&mut self, id: ElementId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }
}

/// Iterator returned by [`ElementTree::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a ElementTree,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
