//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::rc::Rc;

use tactics_core::env::{ArmorData, ProgressionEntry, WeaponData};
use tactics_core::stats::{BabProgression, SaveProgression};
use tactics_core::{
    AbilityScores, AttackReport, CharacterSpec, ClassDefinition, CombatConfig, ContentCatalog,
    DiceExpr, EffectDefinition, EntityId, EventKind, Faction, FeatDefinition, GameEvent,
    ItemDefinition, ItemKind, Position, RaceDefinition, ScriptedDice, World,
};

pub fn class(id: &str, hit_die: u32, bab: BabProgression) -> ClassDefinition {
    ClassDefinition {
        id: id.into(),
        name: id.into(),
        hit_die,
        bab,
        fortitude: SaveProgression::Good,
        reflex: SaveProgression::Poor,
        will: SaveProgression::Poor,
        skill_points: 2,
        progression: Vec::new(),
    }
}

fn feat(id: &str) -> FeatDefinition {
    FeatDefinition {
        id: id.into(),
        name: id.into(),
        bonuses: Vec::new(),
        tags: Vec::new(),
        prerequisites: Vec::new(),
    }
}

fn weapon(id: &str, damage: &str, threat_floor: Option<u32>, ranged: bool, range: u32) -> ItemDefinition {
    ItemDefinition::new(
        id,
        id,
        ItemKind::Weapon(WeaponData {
            damage: damage.parse().unwrap(),
            threat_floor,
            crit_multiplier: None,
            ranged,
            range,
        }),
    )
}

/// A small rule set: human and dwarf, fighter and brawler, a few weapons,
/// armor, a potion and some effects.
pub fn catalog() -> ContentCatalog {
    let mut brawler = class("brawler", 10, BabProgression::Good);
    brawler.progression.push(ProgressionEntry {
        level: 1,
        feats: vec!["improved_trip".into()],
    });
    let mut greater_trip = feat("greater_trip");
    greater_trip.prerequisites.push("improved_trip".into());

    ContentCatalog::new()
        .with_race(RaceDefinition {
            id: "human".into(),
            name: "Human".into(),
            bonuses: Vec::new(),
            speed: 30,
            tags: Vec::new(),
        })
        .with_race(RaceDefinition {
            id: "dwarf".into(),
            name: "Dwarf".into(),
            bonuses: vec![tactics_core::BonusDefinition::new("abilities.con", 2, "racial")],
            speed: 20,
            tags: vec!["darkvision".into()],
        })
        .with_class(class("fighter", 10, BabProgression::Good))
        .with_class(brawler)
        .with_feat(feat("power_attack"))
        .with_feat(feat("improved_trip"))
        .with_feat(greater_trip)
        .with_item(weapon("longsword", "1d8", Some(19), false, 1))
        .with_item(weapon("greataxe", "1d12", None, false, 1))
        .with_item(weapon("shortbow", "1d6", None, true, 12))
        .with_item(ItemDefinition::new(
            "full_plate",
            "Full plate",
            ItemKind::Armor(ArmorData {
                armor_bonus: 8,
                max_dex: Some(1),
            }),
        ))
        .with_item(
            ItemDefinition::new("potion_of_healing", "Potion of healing", ItemKind::Consumable)
                .with_healing(DiceExpr::new(1, 8, 1)),
        )
        .with_item(
            ItemDefinition::new("potion_of_heroism", "Potion of heroism", ItemKind::Consumable)
                .with_effect("heroism"),
        )
        .with_effect(EffectDefinition::new("bless", "Bless").lasting(1).with_bonus("attack", 1, "morale"))
        .with_effect(
            EffectDefinition::new("heroism", "Heroism")
                .lasting(10)
                .with_bonus("attack", 2, "morale"),
        )
        .with_effect(
            EffectDefinition::new("bears_endurance", "Bear's endurance")
                .lasting(10)
                .with_bonus("abilities.con", 4, "enhancement"),
        )
        .with_effect(
            EffectDefinition::new("barkskin", "Barkskin")
                .lasting(10)
                .with_bonus("ac", 15, "natural_armor"),
        )
        .with_effect(EffectDefinition::new("stun", "Stunned").lasting(1).with_tag("stunned"))
        .with_effect(EffectDefinition::new("thorns", "Thorns"))
}

pub fn world(rolls: impl IntoIterator<Item = u32>) -> World {
    world_with(CombatConfig::default(), rolls)
}

pub fn world_with(config: CombatConfig, rolls: impl IntoIterator<Item = u32>) -> World {
    // RUST_LOG=tactics=debug shows the rules at work.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    World::new(config, Rc::new(catalog()), Box::new(ScriptedDice::new(rolls)))
}

/// Human fighter with average scores.
pub fn fighter(name: &str, faction: Faction, levels: u32) -> CharacterSpec {
    CharacterSpec::new(name, faction)
        .race("human")
        .class("fighter", levels)
        .abilities(AbilityScores::default())
}

pub fn spawn(world: &mut World, spec: CharacterSpec) -> EntityId {
    world.try_spawn_character(&spec).unwrap()
}

pub fn spawn_at(world: &mut World, spec: CharacterSpec, x: i32, y: i32) -> EntityId {
    spawn(world, spec.at(Position::new(x, y)))
}

pub fn events_of(world: &World, kind: EventKind) -> Vec<&GameEvent> {
    world
        .events
        .journal()
        .iter()
        .filter(|event| event.kind() == kind)
        .collect()
}

/// Journal index of the first event matching `predicate`.
pub fn position_of(world: &World, predicate: impl Fn(&GameEvent) -> bool) -> Option<usize> {
    world.events.journal().iter().position(predicate)
}

pub fn attack_reports(world: &World) -> Vec<AttackReport> {
    world
        .events
        .journal()
        .iter()
        .filter_map(|event| match event {
            GameEvent::AttackResolved(report) => Some(report.clone()),
            _ => None,
        })
        .collect()
}

pub fn hp(world: &World, id: EntityId) -> i32 {
    world.query_stat(id, tactics_core::stats::paths::CURRENT_HIT_POINTS)
}
