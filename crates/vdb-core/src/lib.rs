#![forbid(unsafe_code)]

//! Element tree primitives for the vdb binding engine.
//!
//! This crate provides:
//! - [`ElementTree`]: an arena of [`Element`]s with parent/child structure,
//!   containment queries, deep cloning, and detached subtrees.
//! - [`Element`]: tag, text slot, property slots, list/property annotation
//!   slots, and change observers.
//! - [`ChangeEvent`]: the data the host hands back to models when an input
//!   element's value changes.

pub mod element;
pub mod tree;

pub use element::{BindingKind, ChangeObserver, Element, VALUE_PROPERTY};
pub use tree::{Ancestors, ChangeEvent, ElementId, ElementTree, TreeError};
