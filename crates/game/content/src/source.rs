//! Asynchronous content sources.
//!
//! A session loads its content once, before any rules run. The only awaits are
//! the file reads; parsing and indexing happen synchronously afterwards.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tactics_core::{CombatConfig, ContentCatalog, ContentError};

use crate::loaders::{CatalogFormat, CatalogLoader, ConfigLoader, ContentFactory, LoadResult, load_error};

/// Somewhere content and configuration can be loaded from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable name used in errors and logs.
    fn name(&self) -> String;

    async fn load_catalog(&self) -> Result<ContentCatalog, ContentError>;

    /// Combat configuration shipped with the content; defaults when absent.
    async fn load_config(&self) -> Result<CombatConfig, ContentError> {
        Ok(CombatConfig::default())
    }
}

/// Loads every catalog file of a data directory with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_catalog_files(&self) -> LoadResult<Vec<(PathBuf, String)>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            anyhow::anyhow!("Failed to read directory {}: {}", self.dir.display(), e)
        })?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && CatalogFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))?;
            files.push((path, content));
        }
        Ok(files)
    }

    async fn catalog(&self) -> LoadResult<ContentCatalog> {
        let mut catalog = ContentCatalog::new();
        for (path, content) in self.read_catalog_files().await? {
            let Some(format) = CatalogFormat::from_path(&path) else {
                continue;
            };
            let part = CatalogLoader::parse(&content, format)
                .map_err(|e| anyhow::anyhow!("{}: {:#}", path.display(), e))?;
            catalog
                .merge(part)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        }
        Ok(catalog)
    }

    async fn config(&self) -> LoadResult<CombatConfig> {
        let path = self.dir.join(ContentFactory::CONFIG_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(CombatConfig::default());
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))?;
        ConfigLoader::parse(&content)
    }
}

#[async_trait]
impl ContentSource for DirectorySource {
    fn name(&self) -> String {
        self.dir.display().to_string()
    }

    async fn load_catalog(&self) -> Result<ContentCatalog, ContentError> {
        let catalog = self
            .catalog()
            .await
            .map_err(|err| load_error(self.name(), err))?;
        tracing::info!(
            target: "tactics::content",
            dir = %self.dir.display(),
            records = catalog.len(),
            "content loaded"
        );
        Ok(catalog)
    }

    async fn load_config(&self) -> Result<CombatConfig, ContentError> {
        self.config()
            .await
            .map_err(|err| load_error(self.name(), err))
    }
}

/// Content already in memory, for tests and embedded rule sets.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    catalog: ContentCatalog,
    config: CombatConfig,
}

impl StaticSource {
    pub fn new(catalog: ContentCatalog) -> Self {
        Self {
            catalog,
            config: CombatConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    fn name(&self) -> String {
        "static".to_owned()
    }

    async fn load_catalog(&self) -> Result<ContentCatalog, ContentError> {
        Ok(self.catalog.clone())
    }

    async fn load_config(&self) -> Result<CombatConfig, ContentError> {
        Ok(self.config.clone())
    }
}

/// Loads the catalog, falling back to an empty one when the source fails.
/// The failure is logged, and every later lookup simply finds no record.
pub async fn load_or_default(source: &dyn ContentSource) -> ContentCatalog {
    match source.load_catalog().await {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(
                target: "tactics::content",
                source = %source.name(),
                error = %err,
                "content load failed, continuing with an empty catalog"
            );
            ContentCatalog::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::ContentOracle;

    #[tokio::test]
    async fn directory_source_reads_catalogs_and_config() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("classes.json"),
            r#"{ "classes": [{ "id": "rogue", "name": "Rogue", "hit_die": 8, "bab": "average" }] }"#,
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("config.toml"), "max_actions_per_turn = 8\n")
            .await
            .unwrap();

        let source = DirectorySource::new(dir.path());
        let catalog = source.load_catalog().await.unwrap();
        assert_eq!(catalog.class("rogue").unwrap().hit_die, 8);
        assert_eq!(source.load_config().await.unwrap().max_actions_per_turn, 8);
    }

    #[tokio::test]
    async fn broken_files_name_the_culprit() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("broken.ron"), "(races: [").await.unwrap();

        let err = DirectorySource::new(dir.path()).load_catalog().await.unwrap_err();
        let ContentError::Load { message, .. } = err else {
            panic!("expected a load error, got {err:?}");
        };
        assert!(message.contains("broken.ron"));
    }

    #[tokio::test]
    async fn failed_loads_fall_back_to_an_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("missing"));

        assert!(load_or_default(&source).await.is_empty());
        assert!(source.load_config().await.is_ok());
    }

    #[tokio::test]
    async fn static_sources_hand_back_their_catalog() {
        let catalog = ContentCatalog::new()
            .with_effect(tactics_core::EffectDefinition::new("haste", "Haste"));
        let source = StaticSource::new(catalog);
        assert_eq!(load_or_default(&source).await.len(), 1);
    }
}
