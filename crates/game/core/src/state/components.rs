//! Per-entity component records owned by the [`super::EntityStore`].
use std::collections::{BTreeMap, BTreeSet};

use super::{Controller, Faction};
use crate::stats::{BabProgression, SaveProgression, SourceId};

/// Display name and allegiance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub faction: Faction,
    pub controller: Controller,
    pub race: Option<String>,
    /// Land speed in feet before modifiers.
    pub base_speed: i32,
}

impl Identity {
    pub const DEFAULT_SPEED: i32 = 30;

    pub fn new(name: impl Into<String>, faction: Faction) -> Self {
        Self {
            name: name.into(),
            faction,
            controller: Controller::default(),
            race: None,
            base_speed: Self::DEFAULT_SPEED,
        }
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }
}

/// One level taken in a class.
///
/// The progression data is copied from the class definition when the level is
/// granted so the stat pipeline never needs content access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLevel {
    pub class_id: String,
    pub hit_die: u32,
    pub bab: BabProgression,
    pub fortitude: SaveProgression,
    pub reflex: SaveProgression,
    pub will: SaveProgression,
    pub skill_points: u32,
}

/// Ordered list of levels, first level first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progression {
    pub levels: Vec<ClassLevel>,
}

impl Progression {
    pub fn character_level(&self) -> usize {
        self.levels.len()
    }

    /// Levels grouped per class, keyed by class id.
    pub fn by_class(&self) -> BTreeMap<&str, (&ClassLevel, i32)> {
        let mut grouped: BTreeMap<&str, (&ClassLevel, i32)> = BTreeMap::new();
        for level in &self.levels {
            grouped
                .entry(level.class_id.as_str())
                .and_modify(|(_, count)| *count += 1)
                .or_insert((level, 1));
        }
        grouped
    }

    pub fn levels_in(&self, class_id: &str) -> usize {
        self.levels
            .iter()
            .filter(|level| level.class_id == class_id)
            .count()
    }
}

/// Current and maximum hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn damage_taken(&self) -> i32 {
        self.max - self.current
    }

    /// Applies a new maximum while keeping the damage already taken.
    ///
    /// A character at or below zero stays there.
    pub fn set_max_preserving_damage(&mut self, max: i32) {
        if self.current <= 0 && self.max > 0 {
            self.max = max;
            return;
        }
        let damage = self.damage_taken();
        self.max = max;
        self.current = max - damage;
    }

    /// Restores to full. Only character finalization does this.
    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EquipSlot {
    MainHand,
    OffHand,
    Body,
}

/// An item worn or wielded, with the source id its modifiers were filed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquippedItem {
    pub item_id: String,
    pub instance: SourceId,
}

/// Equipped slots plus the item ids carried but not in use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Equipment {
    pub slots: BTreeMap<EquipSlot, EquippedItem>,
    pub carried: Vec<String>,
}

impl Equipment {
    pub fn equipped(&self, slot: EquipSlot) -> Option<&EquippedItem> {
        self.slots.get(&slot)
    }

    pub fn is_carrying(&self, item_id: &str) -> bool {
        self.carried.iter().any(|carried| carried == item_id)
    }

    /// Removes one carried copy of `item_id`.
    pub fn take_carried(&mut self, item_id: &str) -> bool {
        match self.carried.iter().position(|carried| carried == item_id) {
            Some(index) => {
                self.carried.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Capability tags and bonus feat slots, each filed under the source that
/// granted it so removal by source leaves nothing behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grants {
    tags: BTreeMap<String, BTreeSet<SourceId>>,
    feat_slots: BTreeMap<SourceId, u32>,
}

impl Grants {
    pub fn grant_tag(&mut self, tag: impl Into<String>, source: SourceId) {
        self.tags.entry(tag.into()).or_default().insert(source);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.get(tag).is_some_and(|sources| !sources.is_empty())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Sources currently granting `tag`.
    pub fn sources_of(&self, tag: &str) -> Vec<SourceId> {
        self.tags
            .get(tag)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn add_feat_slots(&mut self, source: SourceId, count: u32) {
        if count > 0 {
            *self.feat_slots.entry(source).or_default() += count;
        }
    }

    pub fn bonus_feat_slots(&self) -> u32 {
        self.feat_slots.values().sum()
    }

    /// Drops every tag and feat slot granted by `source`.
    ///
    /// Returns how many entries were removed.
    pub fn revoke_source(&mut self, source: &SourceId) -> usize {
        let mut removed = 0;
        self.tags.retain(|_, sources| {
            if sources.remove(source) {
                removed += 1;
            }
            !sources.is_empty()
        });
        if self.feat_slots.remove(source).is_some() {
            removed += 1;
        }
        removed
    }

    pub fn references(&self, source: &SourceId) -> bool {
        self.feat_slots.contains_key(source)
            || self.tags.values().any(|sources| sources.contains(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_recompute_keeps_damage() {
        let mut health = Health::default();
        health.set_max_preserving_damage(12);
        assert_eq!(health.current, 12);

        health.current = 7;
        health.set_max_preserving_damage(15);
        assert_eq!((health.current, health.max), (10, 15));

        health.set_max_preserving_damage(6);
        assert_eq!((health.current, health.max), (1, 6));
    }

    #[test]
    fn dead_characters_stay_down_on_recompute() {
        let mut health = Health { current: -3, max: 10 };
        health.set_max_preserving_damage(20);
        assert_eq!(health.current, -3);
        assert!(!health.is_alive());
    }

    #[test]
    fn revoking_a_source_clears_tags_and_slots() {
        let source = SourceId::new("bless@cleric");
        let other = SourceId::new("feat:alertness");
        let mut grants = Grants::default();
        grants.grant_tag("blessed", source.clone());
        grants.grant_tag("alert", other.clone());
        grants.grant_tag("alert", source.clone());
        grants.add_feat_slots(source.clone(), 1);

        assert_eq!(grants.revoke_source(&source), 3);
        assert!(!grants.has_tag("blessed"));
        assert!(grants.has_tag("alert"));
        assert_eq!(grants.bonus_feat_slots(), 0);
        assert!(!grants.references(&source));
    }

    #[test]
    fn carried_items_are_taken_one_at_a_time() {
        let mut equipment = Equipment {
            carried: vec!["potion".into(), "potion".into()],
            ..Default::default()
        };
        assert!(equipment.take_carried("potion"));
        assert!(equipment.is_carrying("potion"));
        assert!(equipment.take_carried("potion"));
        assert!(!equipment.take_carried("potion"));
    }
}
