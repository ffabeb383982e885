//! Content catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tactics_core::{
    ClassDefinition, ContentCatalog, EffectDefinition, FeatDefinition, ItemDefinition,
    RaceDefinition,
};

use crate::loaders::{LoadResult, read_file};

/// On-disk layout of a catalog file. Every section is optional so content can
/// be split across several files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub races: Vec<RaceDefinition>,
    pub classes: Vec<ClassDefinition>,
    pub feats: Vec<FeatDefinition>,
    pub items: Vec<ItemDefinition>,
    pub effects: Vec<EffectDefinition>,
}

impl CatalogFile {
    /// Indexes the records, failing on the first duplicate id.
    pub fn into_catalog(self) -> LoadResult<ContentCatalog> {
        let mut catalog = ContentCatalog::new();
        for race in self.races {
            catalog.insert_race(race)?;
        }
        for class in self.classes {
            catalog.insert_class(class)?;
        }
        for feat in self.feats {
            catalog.insert_feat(feat)?;
        }
        for item in self.items {
            catalog.insert_item(item)?;
        }
        for effect in self.effects {
            catalog.insert_effect(effect)?;
        }
        Ok(catalog)
    }
}

/// Serialization format of a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Ron,
}

impl CatalogFormat {
    /// Picks the format from the file extension; other files are not catalogs.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "ron" => Some(Self::Ron),
            _ => None,
        }
    }

    pub fn parse(self, content: &str) -> LoadResult<CatalogFile> {
        let file = match self {
            Self::Json => serde_json::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse catalog JSON: {}", e))?,
            Self::Ron => ron::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))?,
        };
        Ok(file)
    }
}

/// Loader for content catalogs from JSON or RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog file, choosing the parser from its extension.
    pub fn load(path: &Path) -> LoadResult<ContentCatalog> {
        let format = CatalogFormat::from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Unsupported catalog file {}", path.display())
        })?;
        let content = read_file(path)?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: CatalogFormat) -> LoadResult<ContentCatalog> {
        format.parse(content)?.into_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{ContentOracle, DiceExpr, ItemKind};

    const JSON: &str = r#"{
        "races": [{ "id": "elf", "name": "Elf", "speed": 30,
                    "bonuses": [{ "target": "abilities.dex", "value": 2, "type": "racial" }] }],
        "items": [
            { "id": "rapier", "name": "Rapier",
              "kind": { "type": "weapon", "damage": "1d6", "threat_floor": 18 } },
            { "id": "potion", "name": "Potion of healing",
              "kind": { "type": "consumable" }, "healing": "1d8+1" }
        ]
    }"#;

    #[test]
    fn parses_json_catalogs() {
        let catalog = CatalogLoader::parse(JSON, CatalogFormat::Json).unwrap();
        assert_eq!(catalog.len(), 3);

        let elf = catalog.race("elf").unwrap();
        assert_eq!(elf.bonuses[0].kind, "racial");

        let rapier = catalog.item("rapier").unwrap().weapon().unwrap();
        assert_eq!(rapier.damage, DiceExpr::new(1, 6, 0));
        assert_eq!(rapier.threat_floor, Some(18));
        assert_eq!(rapier.range, 1);

        let potion = catalog.item("potion").unwrap();
        assert_eq!(potion.kind, ItemKind::Consumable);
        assert_eq!(potion.healing, Some(DiceExpr::new(1, 8, 1)));
    }

    #[test]
    fn parses_ron_catalogs() {
        let ron = r#"(
            classes: [(id: "fighter", name: "Fighter", hit_die: 10, bab: good,
                       progression: [(level: 1, feats: ["power_attack"])])],
            feats: [(id: "power_attack", name: "Power Attack")],
            effects: [(id: "bless", name: "Bless", duration: Some(10),
                       bonuses: [(target: "attack", value: 1)])],
        )"#;
        let catalog = CatalogLoader::parse(ron, CatalogFormat::Ron).unwrap();

        let fighter = catalog.class("fighter").unwrap();
        assert_eq!(fighter.feats_at(1).collect::<Vec<_>>(), vec!["power_attack"]);
        assert_eq!(catalog.effect("bless").unwrap().duration, Some(10));
        assert!(catalog.effect("bless").unwrap().bonuses[0].kind.is_empty());
    }

    #[test]
    fn rejects_duplicates_and_bad_dice() {
        let duplicate = r#"{ "feats": [{ "id": "dodge", "name": "Dodge" },
                                       { "id": "dodge", "name": "Dodge" }] }"#;
        let err = CatalogLoader::parse(duplicate, CatalogFormat::Json).unwrap_err();
        assert!(err.to_string().contains("duplicate feat id 'dodge'"));

        let dice = r#"{ "items": [{ "id": "club", "name": "Club",
                                    "kind": { "type": "weapon", "damage": "1d" } }] }"#;
        assert!(CatalogLoader::parse(dice, CatalogFormat::Json).is_err());
    }

    #[test]
    fn formats_follow_the_extension() {
        assert_eq!(CatalogFormat::from_path(Path::new("a/races.json")), Some(CatalogFormat::Json));
        assert_eq!(CatalogFormat::from_path(Path::new("items.ron")), Some(CatalogFormat::Ron));
        assert_eq!(CatalogFormat::from_path(Path::new("config.toml")), None);
        assert!(CatalogLoader::load(Path::new("notes.txt")).is_err());
    }
}
