//! Content factory for loading a whole data directory synchronously.

use std::path::{Path, PathBuf};

use tactics_core::{CombatConfig, ContentCatalog, ContentError};

use crate::loaders::{CatalogFormat, CatalogLoader, ConfigLoader, LoadResult, load_error};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── races.json
/// ├── classes.ron
/// └── items.ron
/// ```
///
/// Every `.json` and `.ron` file is a catalog; they are merged in file name
/// order and an id defined twice is an error.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Catalog files in the directory, sorted by name.
    pub fn catalog_files(&self) -> LoadResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.data_dir).map_err(|e| {
            anyhow::anyhow!("Failed to read directory {}: {}", self.data_dir.display(), e)
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && CatalogFormat::from_path(&path).is_some() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load and merge every catalog file in the directory.
    pub fn load_catalog(&self) -> LoadResult<ContentCatalog> {
        let mut catalog = ContentCatalog::new();
        for path in self.catalog_files()? {
            let part = CatalogLoader::load(&path)?;
            tracing::debug!(
                target: "tactics::content",
                file = %path.display(),
                records = part.len(),
                "loaded catalog file"
            );
            catalog
                .merge(part)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        }
        Ok(catalog)
    }

    /// Same as [`Self::load_catalog`] with the error converted for the core.
    pub fn try_load_catalog(&self) -> Result<ContentCatalog, ContentError> {
        self.load_catalog()
            .map_err(|err| load_error(self.data_dir.display(), err))
    }

    /// Load combat configuration from `config.toml`, or the defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
