//! Static content records and the oracle the engine reads them through.
//!
//! Records are plain data. The engine never mutates them; it copies what it
//! needs into the entity store when a race, class level, feat, item or effect
//! is applied.
use std::collections::BTreeMap;

use super::{ContentError, DiceExpr};
use crate::state::ClassLevel;
use crate::stats::{BabProgression, Modifier, ModifierKind, SaveProgression, SourceId};

#[cfg(feature = "serde")]
fn default_speed() -> i32 {
    crate::state::Identity::DEFAULT_SPEED
}

#[cfg(feature = "serde")]
fn default_reach() -> u32 {
    1
}

/// A typed bonus as written in content files.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusDefinition {
    pub target: String,
    pub value: i32,
    /// Bonus type name; empty means untyped.
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub kind: String,
}

impl BonusDefinition {
    pub fn new(target: impl Into<String>, value: i32, kind: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            value,
            kind: kind.into(),
        }
    }

    pub fn to_modifier(&self, source: &str, source_id: &SourceId) -> Modifier {
        Modifier::new(
            self.value,
            ModifierKind::parse(&self.kind),
            self.target.clone(),
            source,
        )
        .with_source_id(source_id.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceDefinition {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<BonusDefinition>,
    /// Base land speed in feet.
    #[cfg_attr(feature = "serde", serde(default = "default_speed"))]
    pub speed: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
}

impl RaceDefinition {
    /// Racial traits as a permanent `race:<id>` effect.
    pub fn as_effect(&self) -> EffectDefinition {
        EffectDefinition {
            id: format!("race:{}", self.id),
            name: self.name.clone(),
            duration: None,
            bonuses: self.bonuses.clone(),
            tags: self.tags.clone(),
            feat_slots: 0,
        }
    }
}

/// Feats granted when a class level is reached.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressionEntry {
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub feats: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDefinition {
    pub id: String,
    pub name: String,
    pub hit_die: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bab: BabProgression,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fortitude: SaveProgression,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reflex: SaveProgression,
    #[cfg_attr(feature = "serde", serde(default))]
    pub will: SaveProgression,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_points: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub progression: Vec<ProgressionEntry>,
}

impl ClassDefinition {
    /// Progression data copied into the entity for one level of this class.
    pub fn level_record(&self) -> ClassLevel {
        ClassLevel {
            class_id: self.id.clone(),
            hit_die: self.hit_die,
            bab: self.bab,
            fortitude: self.fortitude,
            reflex: self.reflex,
            will: self.will,
            skill_points: self.skill_points,
        }
    }

    /// Feats granted on reaching `level` in this class.
    pub fn feats_at(&self, level: u32) -> impl Iterator<Item = &str> {
        self.progression
            .iter()
            .filter(move |entry| entry.level == level)
            .flat_map(|entry| entry.feats.iter().map(String::as_str))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatDefinition {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<BonusDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    /// Tags the character must already hold.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prerequisites: Vec<String>,
}

impl FeatDefinition {
    /// A feat is applied as a permanent effect so it can be revoked by source.
    /// The effect also grants the feat id as a tag, which is what other feats
    /// list as prerequisites.
    pub fn as_effect(&self) -> EffectDefinition {
        let mut tags = self.tags.clone();
        if !tags.contains(&self.id) {
            tags.push(self.id.clone());
        }
        EffectDefinition {
            id: format!("feat:{}", self.id),
            name: self.name.clone(),
            duration: None,
            bonuses: self.bonuses.clone(),
            tags,
            feat_slots: 0,
        }
    }
}

/// A named bundle of modifiers and tags with an optional duration in rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub id: String,
    pub name: String,
    /// Rounds until expiry; `None` lasts until removed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<BonusDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    /// Bonus feat slots granted while active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub feat_slots: u32,
}

impl EffectDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration: None,
            bonuses: Vec::new(),
            tags: Vec::new(),
            feat_slots: 0,
        }
    }

    pub fn lasting(mut self, rounds: u32) -> Self {
        self.duration = Some(rounds);
        self
    }

    pub fn with_bonus(mut self, target: &str, value: i32, kind: &str) -> Self {
        self.bonuses.push(BonusDefinition::new(target, value, kind));
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_owned());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponData {
    pub damage: DiceExpr,
    /// Lowest natural d20 that threatens a critical.
    #[cfg_attr(feature = "serde", serde(default))]
    pub threat_floor: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_multiplier: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ranged: bool,
    /// Reach for melee weapons, maximum range for ranged ones, in squares.
    #[cfg_attr(feature = "serde", serde(default = "default_reach"))]
    pub range: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorData {
    pub armor_bonus: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_dex: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ItemKind {
    Weapon(WeaponData),
    Armor(ArmorData),
    Shield(ArmorData),
    /// Used up on use; applies the item's effects to the user.
    Consumable,
    Gear,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// Applied while equipped.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<BonusDefinition>,
    /// Effect ids applied when a consumable is used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<String>,
    /// Hit points restored when a consumable is used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub healing: Option<DiceExpr>,
}

impl ItemDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            bonuses: Vec::new(),
            effects: Vec::new(),
            healing: None,
        }
    }

    pub fn with_bonus(mut self, target: &str, value: i32, kind: &str) -> Self {
        self.bonuses.push(BonusDefinition::new(target, value, kind));
        self
    }

    pub fn with_effect(mut self, effect_id: impl Into<String>) -> Self {
        self.effects.push(effect_id.into());
        self
    }

    pub fn with_healing(mut self, healing: DiceExpr) -> Self {
        self.healing = Some(healing);
        self
    }

    pub fn weapon(&self) -> Option<&WeaponData> {
        match &self.kind {
            ItemKind::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn is_equippable(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Weapon(_) | ItemKind::Armor(_) | ItemKind::Shield(_)
        )
    }
}

/// Read-only access to content records by id.
pub trait ContentOracle {
    fn race(&self, id: &str) -> Option<&RaceDefinition>;
    fn class(&self, id: &str) -> Option<&ClassDefinition>;
    fn feat(&self, id: &str) -> Option<&FeatDefinition>;
    fn item(&self, id: &str) -> Option<&ItemDefinition>;
    fn effect(&self, id: &str) -> Option<&EffectDefinition>;
}

/// In-memory content indexed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentCatalog {
    races: BTreeMap<String, RaceDefinition>,
    classes: BTreeMap<String, ClassDefinition>,
    feats: BTreeMap<String, FeatDefinition>,
    items: BTreeMap<String, ItemDefinition>,
    effects: BTreeMap<String, EffectDefinition>,
}

macro_rules! catalog_section {
    ($insert:ident, $with:ident, $field:ident: $ty:ty => $kind:literal) => {
        pub fn $insert(&mut self, record: $ty) -> Result<(), ContentError> {
            if self.$field.contains_key(&record.id) {
                return Err(ContentError::Duplicate {
                    kind: $kind,
                    id: record.id,
                });
            }
            self.$field.insert(record.id.clone(), record);
            Ok(())
        }

        /// Builder form; a duplicate id replaces the earlier record.
        pub fn $with(mut self, record: $ty) -> Self {
            self.$field.insert(record.id.clone(), record);
            self
        }
    };
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    catalog_section!(insert_race, with_race, races: RaceDefinition => "race");
    catalog_section!(insert_class, with_class, classes: ClassDefinition => "class");
    catalog_section!(insert_feat, with_feat, feats: FeatDefinition => "feat");
    catalog_section!(insert_item, with_item, items: ItemDefinition => "item");
    catalog_section!(insert_effect, with_effect, effects: EffectDefinition => "effect");

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.races.len()
            + self.classes.len()
            + self.feats.len()
            + self.items.len()
            + self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves every record of `other` in, failing on the first duplicate id.
    pub fn merge(&mut self, other: ContentCatalog) -> Result<(), ContentError> {
        other
            .races
            .into_values()
            .try_for_each(|record| self.insert_race(record))?;
        other
            .classes
            .into_values()
            .try_for_each(|record| self.insert_class(record))?;
        other
            .feats
            .into_values()
            .try_for_each(|record| self.insert_feat(record))?;
        other
            .items
            .into_values()
            .try_for_each(|record| self.insert_item(record))?;
        other
            .effects
            .into_values()
            .try_for_each(|record| self.insert_effect(record))
    }
}

impl ContentOracle for ContentCatalog {
    fn race(&self, id: &str) -> Option<&RaceDefinition> {
        self.races.get(id)
    }

    fn class(&self, id: &str) -> Option<&ClassDefinition> {
        self.classes.get(id)
    }

    fn feat(&self, id: &str) -> Option<&FeatDefinition> {
        self.feats.get(id)
    }

    fn item(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    fn effect(&self, id: &str) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bless() -> EffectDefinition {
        EffectDefinition::new("bless", "Bless")
            .lasting(10)
            .with_bonus("attack", 1, "morale")
    }

    #[test]
    fn catalog_rejects_duplicate_ids() {
        let mut catalog = ContentCatalog::new();
        catalog.insert_effect(bless()).unwrap();
        let err = catalog.insert_effect(bless()).unwrap_err();
        assert_eq!(
            err,
            ContentError::Duplicate {
                kind: "effect",
                id: "bless".into()
            }
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn merge_combines_catalogs() {
        let mut left = ContentCatalog::new().with_effect(bless());
        let right = ContentCatalog::new().with_feat(FeatDefinition {
            id: "dodge".into(),
            name: "Dodge".into(),
            bonuses: vec![BonusDefinition::new("ac", 1, "dodge")],
            tags: Vec::new(),
            prerequisites: Vec::new(),
        });
        left.merge(right).unwrap();
        assert!(left.feat("dodge").is_some());
        assert!(left.effect("bless").is_some());
        assert!(left.merge(ContentCatalog::new().with_effect(bless())).is_err());
    }

    #[test]
    fn bonus_definitions_become_sourced_modifiers() {
        let source = SourceId::composite("bless", "cleric");
        let modifier = BonusDefinition::new("attack", 1, "morale").to_modifier("Bless", &source);
        assert_eq!(modifier.kind, ModifierKind::Morale);
        assert_eq!(modifier.source_id, Some(source));

        let untyped = BonusDefinition::new("ac", -2, "").to_modifier("x", &SourceId::new("x"));
        assert_eq!(untyped.kind, ModifierKind::Untyped);
    }

    #[test]
    fn class_progression_lists_feats_by_level() {
        let fighter = ClassDefinition {
            id: "fighter".into(),
            name: "Fighter".into(),
            hit_die: 10,
            bab: BabProgression::Good,
            fortitude: SaveProgression::Good,
            reflex: SaveProgression::Poor,
            will: SaveProgression::Poor,
            skill_points: 2,
            progression: vec![
                ProgressionEntry {
                    level: 1,
                    feats: vec!["power_attack".into()],
                },
                ProgressionEntry {
                    level: 2,
                    feats: vec!["dodge".into()],
                },
            ],
        };
        assert_eq!(fighter.feats_at(2).collect::<Vec<_>>(), vec!["dodge"]);
        assert_eq!(fighter.level_record().hit_die, 10);
    }

    #[test]
    fn feats_grant_their_own_id_as_a_tag() {
        let feat = FeatDefinition {
            id: "improved_trip".into(),
            name: "Improved Trip".into(),
            bonuses: vec![BonusDefinition::new("cmb", 2, "untyped")],
            tags: Vec::new(),
            prerequisites: Vec::new(),
        };
        let effect = feat.as_effect();
        assert_eq!(effect.id, "feat:improved_trip");
        assert_eq!(effect.tags, vec!["improved_trip".to_owned()]);
        assert_eq!(effect.duration, None);
    }
}
