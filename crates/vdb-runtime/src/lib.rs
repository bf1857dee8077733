#![forbid(unsafe_code)]

//! Declarative two-way data binding between JSON models and an element tree.
//!
//! Elements carry binding annotations of the form `model>path` or
//! `model>path>attribute`. A [`Model`] resolves them to absolute paths once,
//! at registration, then:
//!
//! - pushes data into elements on every write ([`Model::set_property`]),
//! - expands list regions from a template child per array item
//!   ([`Model::materialize`], [`Model::append_list_item`]),
//! - writes user input back through change observers ([`Page::input`]).
//!
//! [`Page`] owns the tree together with all named models and routes change
//! events between them. [`I18nModel`] fills an `i18n` model from translation
//! resources.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use vdb_core::{Element, ElementTree};
//! use vdb_runtime::Page;
//!
//! let mut tree = ElementTree::new();
//! let root = tree.root();
//! let list = tree
//!     .append(root, Element::new("ul").bind_list("shop>products"))
//!     .unwrap();
//! let template = tree.append(list, Element::new("li")).unwrap();
//! tree.append(template, Element::new("span").bind_property("shop>name"))
//!     .unwrap();
//!
//! let mut page = Page::new(tree);
//! page.add_json_model("shop", json!({ "products": [{ "name": "Apples" }] }))
//!     .unwrap();
//! page.append_list_item("shop", "products", json!({ "name": "Pears" }))
//!     .unwrap();
//! assert_eq!(page.tree().children(list).len(), 2);
//! ```

pub mod annotation;
pub mod bridge;
pub mod error;
pub mod i18n;
pub mod list;
pub mod model;
pub mod page;
pub mod path;
pub mod resolve;
pub mod store;
pub mod sync;

pub use annotation::{AnnotationError, Binding};
pub use error::ModelError;
pub use i18n::{I18N_MODEL, I18nModel};
pub use list::AppendedItem;
pub use model::{DerivedBindings, Model};
pub use page::Page;
pub use sync::SweepReport;
