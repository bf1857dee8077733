#![forbid(unsafe_code)]

//! Translation resources for the vdb binding engine.
//!
//! This crate provides:
//! - [`Translations`]: parsing of flat `key=value` resources into model data.
//! - [`LanguageSources`]: override → fragment → environment → default
//!   language negotiation.
//! - [`ResourceSource`] with [`DirectorySource`] and [`MemorySource`], plus
//!   [`load_translations`] which retries the untagged default resource when
//!   the localized one is not found.
//! - [`ResourceConfig`]: resource naming, optionally loaded from TOML.

pub mod config;
pub mod negotiate;
pub mod resource;
pub mod source;

pub use config::ResourceConfig;
pub use negotiate::LanguageSources;
pub use resource::{I18nError, Translations};
pub use source::{
    DirectorySource, Fetched, LoadedTranslations, MemorySource, ResourceSource, load_translations,
};
