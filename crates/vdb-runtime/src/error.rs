//! Engine error type.
//!
//! Most failures are local: the sweep and the list materializer log them and
//! move on to the next subscriber or region. They surface as values of
//! [`ModelError`] only where a caller asked for one specific thing (a read, a
//! write, one region).

use core::fmt;

use vdb_core::{ElementId, TreeError};
use vdb_i18n::I18nError;

use crate::annotation::AnnotationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An element's annotation could not be parsed.
    Annotation(AnnotationError),
    /// A read walked off the data tree (missing key/index or `null`).
    PathNotFound { model: String, path: String },
    /// A write needed an intermediate container that does not exist.
    MissingContainer {
        model: String,
        path: String,
        segment: String,
    },
    /// A write addressed an array index past its end.
    IndexOutOfBounds {
        model: String,
        path: String,
        index: usize,
        len: usize,
    },
    /// The path exists but does not hold an array.
    NotAList { model: String, path: String },
    /// A list region has no template child.
    MalformedRegion { model: String, element: ElementId },
    /// `bound_item` was called for an element outside any list region.
    NotInListContext { model: String, element: ElementId },
    /// The element has no binding of the requested kind for this model.
    NotBound { model: String, element: ElementId },
    /// The id does not refer to a live element.
    UnknownElement(ElementId),
    /// A model with this name already exists in the page.
    DuplicateModel(String),
    UnknownModel(String),
    Tree(TreeError),
    I18n(I18nError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotation(e) => write!(f, "invalid binding annotation: {e}"),
            Self::PathNotFound { model, path } => {
                write!(f, "property '{path}' not found in the '{model}' model")
            }
            Self::MissingContainer {
                model,
                path,
                segment,
            } => write!(
                f,
                "cannot write '{path}' in the '{model}' model: '{segment}' is not an existing object or array"
            ),
            Self::IndexOutOfBounds {
                model,
                path,
                index,
                len,
            } => write!(
                f,
                "cannot write '{path}' in the '{model}' model: index {index} is past the end (len {len})"
            ),
            Self::NotAList { model, path } => {
                write!(f, "property '{path}' in the '{model}' model is not a list")
            }
            Self::MalformedRegion { model, element } => write!(
                f,
                "list region {element} of the '{model}' model has no template child"
            ),
            Self::NotInListContext { model, element } => write!(
                f,
                "element {element} is not inside a list binding of the '{model}' model"
            ),
            Self::NotBound { model, element } => {
                write!(f, "element {element} is not bound to the '{model}' model")
            }
            Self::UnknownElement(id) => write!(f, "unknown element {id}"),
            Self::DuplicateModel(name) => write!(f, "a model named '{name}' already exists"),
            Self::UnknownModel(name) => write!(f, "no model named '{name}'"),
            Self::Tree(e) => write!(f, "element tree: {e}"),
            Self::I18n(e) => write!(f, "translations: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Annotation(e) => Some(e),
            Self::Tree(e) => Some(e),
            Self::I18n(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AnnotationError> for ModelError {
    fn from(e: AnnotationError) -> Self {
        Self::Annotation(e)
    }
}

impl From<TreeError> for ModelError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::UnknownElement(id) => Self::UnknownElement(id),
            other => Self::Tree(other),
        }
    }
}

impl From<I18nError> for ModelError {
    fn from(e: I18nError) -> Self {
        Self::I18n(e)
    }
}
