//! Combat configuration loader.

use std::path::Path;

use tactics_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::ReadiedExpiry;

    #[test]
    fn partial_files_keep_defaults() {
        let config = ConfigLoader::parse(
            r#"
            max_event_depth = 16
            grid_width = 20
            grid_height = 12
            readied_expiry = "end_of_combat"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_event_depth, 16);
        assert!(config.is_bounded());
        assert_eq!(config.readied_expiry, ReadiedExpiry::EndOfCombat);
        assert_eq!(config.base_armor_class, CombatConfig::DEFAULT_BASE_ARMOR_CLASS);
        assert!(config.record_events);
    }

    #[test]
    fn empty_file_is_the_default_config() {
        assert_eq!(ConfigLoader::parse("").unwrap(), CombatConfig::default());
        assert!(ConfigLoader::parse("max_event_depth = \"deep\"").is_err());
    }
}
