//! Data-driven content definitions and loaders.
//!
//! This crate reads rule content and combat configuration from data files:
//! - Content catalogs (races, classes, feats, items, effects) as JSON or RON
//! - Combat configuration as TOML
//! - Whole data directories, synchronously or through an async [`ContentSource`]
//!
//! Content is consumed by the rules core through its `ContentOracle` trait and
//! never appears in entity state. Loaders work in `anyhow` internally and hand
//! callers a `ContentError::Load` at the boundary.

pub mod loaders;
pub mod source;

pub use loaders::{CatalogFile, CatalogFormat, CatalogLoader, ConfigLoader, ContentFactory};
pub use source::{ContentSource, DirectorySource, StaticSource, load_or_default};
