//! Content loaders for reading game data from files.
//!
//! Catalog files are JSON or RON, picked by extension; configuration is TOML.

pub mod catalog;
pub mod config;
pub mod factory;

pub use catalog::{CatalogFile, CatalogFormat, CatalogLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::Path;

use tactics_core::ContentError;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Converts a loader failure into the error the rules core understands.
pub(crate) fn load_error(source_name: impl std::fmt::Display, err: anyhow::Error) -> ContentError {
    ContentError::Load {
        source_name: source_name.to_string(),
        message: format!("{err:#}"),
    }
}
