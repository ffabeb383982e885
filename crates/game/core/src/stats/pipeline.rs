//! Two-phase stat pipeline.
//!
//! ```text
//! [ base scores + ledger "abilities.*" ] -> effective scores, modifiers
//!              ↓
//! [ class levels + ledger totals ] -> BAB, saves, AC, attacks, HP, ...
//! ```
//!
//! Phase two only reads phase one's output, never the raw base scores, so a
//! strength bonus always reaches melee attack and CMB in the same pass.
use strum::IntoEnumIterator;
use tracing::trace;

use super::{Ability, AbilityScores, ModifierKind, ModifierLedger, paths};
use crate::config::CombatConfig;
use crate::state::{
    ClassLevel, EntityId, EntityStore, Grants, Health, Identity, Progression, StoreError,
};

/// Tag granting extra reactions per round from dexterity.
pub const COMBAT_REFLEXES: &str = "combat_reflexes";
/// Tag that denies dexterity to AC.
pub const FLAT_FOOTED: &str = "flat_footed";

/// Derived statistics written back to the store after each recalculation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStats {
    /// Effective ability scores after ledger modifiers.
    pub abilities: AbilityScores,
    pub base_attack_bonus: i32,
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
    pub armor_class: i32,
    pub touch_armor_class: i32,
    pub flat_footed_armor_class: i32,
    pub melee_attack: i32,
    pub ranged_attack: i32,
    pub maneuver_bonus: i32,
    pub maneuver_defense: i32,
    pub initiative: i32,
    /// Feet per move action.
    pub speed: i32,
    pub max_hit_points: i32,
    pub skill_points: i32,
    pub reactions_per_round: u32,
}

impl ComputedStats {
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    /// Squares covered by one move action.
    pub fn speed_squares(&self) -> u32 {
        (self.speed.max(0) / 5) as u32
    }

    /// Value of a derived stat by path, if the path names one.
    pub fn get(&self, path: &str) -> Option<i32> {
        if let Some(ability) = path.strip_suffix(paths::MODIFIER_SUFFIX) {
            return Ability::iter()
                .find(|candidate| candidate.path() == ability)
                .map(|ability| self.modifier(ability));
        }
        if let Some(ability) = Ability::iter().find(|candidate| candidate.path() == path) {
            return Some(self.abilities.get(ability));
        }
        let value = match path {
            paths::BAB => self.base_attack_bonus,
            paths::FORTITUDE => self.fortitude,
            paths::REFLEX => self.reflex,
            paths::WILL => self.will,
            paths::AC => self.armor_class,
            "ac.touch" => self.touch_armor_class,
            "ac.flat_footed" => self.flat_footed_armor_class,
            paths::MELEE_ATTACK => self.melee_attack,
            paths::RANGED_ATTACK => self.ranged_attack,
            paths::CMB => self.maneuver_bonus,
            paths::CMD => self.maneuver_defense,
            paths::INITIATIVE => self.initiative,
            paths::SPEED => self.speed,
            paths::HIT_POINTS => self.max_hit_points,
            paths::SKILL_POINTS => self.skill_points,
            paths::REACTIONS => self.reactions_per_round as i32,
            _ => return None,
        };
        Some(value)
    }
}

/// Recomputes all derived stats of `id` from its base components.
///
/// Writes the result back to the store and refits maximum hit points while
/// preserving damage already taken. The entity's current hit points are never
/// raised by this call.
pub fn recalculate(
    store: &mut EntityStore,
    config: &CombatConfig,
    id: EntityId,
) -> Result<ComputedStats, StoreError> {
    let stats = compute(store, config, id)?;
    match store.health_mut(id) {
        Ok(health) => health.set_max_preserving_damage(stats.max_hit_points),
        // First calculation for a fresh entity creates its health record.
        Err(StoreError::MissingComponent { .. }) => {
            let mut health = Health::default();
            health.set_max_preserving_damage(stats.max_hit_points);
            store.set_health(id, health);
        }
        Err(err) => return Err(err),
    }
    store.set_stats(id, stats.clone());
    trace!(
        target: "tactics::stats",
        entity = %id,
        ac = stats.armor_class,
        hp = stats.max_hit_points,
        "stats recalculated"
    );
    Ok(stats)
}

/// Pure computation of derived stats without writing anything back.
pub fn compute(
    store: &EntityStore,
    config: &CombatConfig,
    id: EntityId,
) -> Result<ComputedStats, StoreError> {
    let base = store.attributes(id)?;
    let progression = store.progression(id)?;
    let ledger = store.ledger(id)?;
    let grants = store.grants(id)?;
    let identity = store.identity(id)?;

    let abilities = effective_abilities(base, ledger);
    Ok(derive(&abilities, progression, ledger, grants, identity, config))
}

/// Phase one: base scores plus `abilities.<name>` ledger totals.
fn effective_abilities(base: &AbilityScores, ledger: &ModifierLedger) -> AbilityScores {
    let mut effective = *base;
    for ability in Ability::iter() {
        effective.set(ability, base.get(ability) + ledger.total(ability.path()));
    }
    effective
}

/// Phase two: everything that depends on effective scores.
fn derive(
    abilities: &AbilityScores,
    progression: &Progression,
    ledger: &ModifierLedger,
    grants: &Grants,
    identity: &Identity,
    config: &CombatConfig,
) -> ComputedStats {
    let str_mod = abilities.modifier(Ability::Str);
    let dex_mod = abilities.modifier(Ability::Dex);
    let con_mod = abilities.modifier(Ability::Con);
    let int_mod = abilities.modifier(Ability::Int);
    let wis_mod = abilities.modifier(Ability::Wis);

    let per_class = progression.by_class();
    let class_bab: i32 = per_class
        .values()
        .map(|(level, count)| level.bab.base_attack(*count))
        .sum();
    let bab = class_bab + ledger.total(paths::BAB);

    let base_save = |pick: fn(&ClassLevel) -> super::SaveProgression| -> i32 {
        per_class
            .values()
            .map(|(level, count)| pick(level).base_save(*count))
            .sum()
    };
    let fortitude = base_save(|level| level.fortitude)
        + con_mod
        + ledger.total_over(&[paths::SAVES, paths::FORTITUDE]);
    let reflex = base_save(|level| level.reflex)
        + dex_mod
        + ledger.total_over(&[paths::SAVES, paths::REFLEX]);
    let will = base_save(|level| level.will)
        + wis_mod
        + ledger.total_over(&[paths::SAVES, paths::WILL]);

    let mut ac_dex = dex_mod.min(ledger.lowest(paths::MAX_DEX));
    if grants.has_tag(FLAT_FOOTED) {
        ac_dex = ac_dex.min(0);
    }
    let base_ac = config.base_armor_class;
    let armor_class = base_ac + ac_dex + ledger.total(paths::AC);
    let touch_armor_class = base_ac
        + ac_dex
        + ledger.total_where(paths::AC, |modifier| {
            !matches!(
                modifier.kind,
                ModifierKind::Armor | ModifierKind::Shield | ModifierKind::NaturalArmor
            )
        });
    let flat_footed_armor_class = base_ac
        + ac_dex.min(0)
        + ledger.total_where(paths::AC, |modifier| modifier.kind != ModifierKind::Dodge);

    let melee_attack = bab + str_mod + ledger.total_over(&[paths::ATTACK, paths::MELEE_ATTACK]);
    let ranged_attack = bab + dex_mod + ledger.total_over(&[paths::ATTACK, paths::RANGED_ATTACK]);
    let maneuver_bonus = bab + str_mod + ledger.total(paths::CMB);
    let maneuver_defense = base_ac + bab + str_mod + ac_dex + ledger.total(paths::CMD);

    let level_hit_points: i32 = progression
        .levels
        .iter()
        .map(|level| (level.hit_die as i32 / 2 + 1 + con_mod).max(1))
        .sum();
    let max_hit_points = (level_hit_points + ledger.total(paths::HIT_POINTS)).max(1);

    let skill_points: i32 = progression
        .levels
        .iter()
        .enumerate()
        .map(|(index, level)| {
            let per_level = (level.skill_points as i32 + int_mod).max(1);
            if index == 0 { per_level * 4 } else { per_level }
        })
        .sum::<i32>()
        + ledger.total(paths::SKILL_POINTS);

    let mut reactions = if grants.has_tag(COMBAT_REFLEXES) {
        (1 + dex_mod).max(1)
    } else {
        1
    };
    reactions += ledger.total(paths::REACTIONS);

    ComputedStats {
        abilities: *abilities,
        base_attack_bonus: bab,
        fortitude,
        reflex,
        will,
        armor_class,
        touch_armor_class,
        flat_footed_armor_class,
        melee_attack,
        ranged_attack,
        maneuver_bonus,
        maneuver_defense,
        initiative: dex_mod + ledger.total(paths::INITIATIVE),
        speed: (identity.base_speed + ledger.total(paths::SPEED)).max(0),
        max_hit_points,
        skill_points,
        reactions_per_round: reactions.max(0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Faction;
    use crate::stats::{BabProgression, Modifier, SaveProgression, SourceId};

    fn fighter_level() -> ClassLevel {
        ClassLevel {
            class_id: "fighter".into(),
            hit_die: 10,
            bab: BabProgression::Good,
            fortitude: SaveProgression::Good,
            reflex: SaveProgression::Poor,
            will: SaveProgression::Poor,
            skill_points: 2,
        }
    }

    fn fighter(store: &mut EntityStore, levels: usize, scores: AbilityScores) -> EntityId {
        let id = store.spawn(Identity::new("Valeros", Faction::Player));
        store.set_attributes(id, scores);
        store.set_progression(
            id,
            Progression {
                levels: vec![fighter_level(); levels],
            },
        );
        id
    }

    fn add(store: &mut EntityStore, id: EntityId, modifier: Modifier) {
        store.ledger_mut(id).unwrap().add(modifier).unwrap();
    }

    #[test]
    fn derives_core_numbers_for_a_fighter() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let id = fighter(&mut store, 2, AbilityScores::new(16, 14, 12, 10, 8, 10));

        let stats = recalculate(&mut store, &config, id).unwrap();
        assert_eq!(stats.base_attack_bonus, 2);
        assert_eq!(stats.melee_attack, 5);
        assert_eq!(stats.ranged_attack, 4);
        assert_eq!(stats.fortitude, 2 + 1 + 1);
        assert_eq!(stats.reflex, 2);
        assert_eq!(stats.will, -1);
        assert_eq!(stats.armor_class, 12);
        assert_eq!(stats.initiative, 2);
        assert_eq!(stats.max_hit_points, 2 * (5 + 1 + 1));
        assert_eq!(stats.skill_points, 2 * 4 + 2);
        assert_eq!(stats.speed_squares(), 6);
        assert_eq!(store.health(id).unwrap().current, 14);
    }

    #[test]
    fn strength_bonus_flows_into_melee_attack() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let id = fighter(&mut store, 1, AbilityScores::default());
        add(
            &mut store,
            id,
            Modifier::new(4, ModifierKind::Enhancement, paths::STR, "bull's strength"),
        );

        let stats = recalculate(&mut store, &config, id).unwrap();
        assert_eq!(stats.abilities.str, 14);
        assert_eq!(stats.melee_attack, 1 + 2);
        assert_eq!(stats.maneuver_bonus, 1 + 2);
    }

    #[test]
    fn armor_caps_dexterity_to_ac() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let id = fighter(&mut store, 1, AbilityScores::new(10, 18, 10, 10, 10, 10));
        add(&mut store, id, Modifier::new(1, ModifierKind::Armor, paths::MAX_DEX, "full plate"));

        let stats = recalculate(&mut store, &config, id).unwrap();
        assert_eq!(stats.armor_class, 10 + 1);
    }

    #[test]
    fn flat_footed_denies_positive_dexterity_only() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let nimble = fighter(&mut store, 1, AbilityScores::new(10, 16, 10, 10, 10, 10));
        let clumsy = fighter(&mut store, 1, AbilityScores::new(10, 6, 10, 10, 10, 10));
        for id in [nimble, clumsy] {
            store
                .grants_mut(id)
                .unwrap()
                .grant_tag(FLAT_FOOTED, SourceId::new("flat_footed@test"));
        }

        assert_eq!(recalculate(&mut store, &config, nimble).unwrap().armor_class, 10);
        assert_eq!(recalculate(&mut store, &config, clumsy).unwrap().armor_class, 8);
    }

    #[test]
    fn touch_and_flat_footed_ac_split_bonus_kinds() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let id = fighter(&mut store, 1, AbilityScores::new(10, 14, 10, 10, 10, 10));
        add(&mut store, id, Modifier::new(4, ModifierKind::Armor, paths::AC, "chain shirt"));
        add(&mut store, id, Modifier::new(1, ModifierKind::Dodge, paths::AC, "dodge"));
        add(&mut store, id, Modifier::new(1, ModifierKind::Deflection, paths::AC, "ring"));

        let stats = recalculate(&mut store, &config, id).unwrap();
        assert_eq!(stats.armor_class, 10 + 2 + 6);
        assert_eq!(stats.touch_armor_class, 10 + 2 + 2);
        assert_eq!(stats.flat_footed_armor_class, 10 + 5);
    }

    #[test]
    fn recompute_never_heals() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let id = fighter(&mut store, 1, AbilityScores::new(10, 10, 14, 10, 10, 10));
        recalculate(&mut store, &config, id).unwrap();
        assert_eq!(store.health(id).unwrap().max, 8);

        store.set_health(id, Health { current: 3, max: 8 });
        add(&mut store, id, Modifier::new(2, ModifierKind::Enhancement, paths::CON, "amulet"));
        recalculate(&mut store, &config, id).unwrap();
        assert_eq!(*store.health(id).unwrap(), Health { current: 4, max: 9 });

        recalculate(&mut store, &config, id).unwrap();
        assert_eq!(store.health(id).unwrap().current, 4);
    }

    #[test]
    fn combat_reflexes_adds_dexterity_reactions() {
        let mut store = EntityStore::new();
        let config = CombatConfig::default();
        let id = fighter(&mut store, 1, AbilityScores::new(10, 16, 10, 10, 10, 10));
        assert_eq!(recalculate(&mut store, &config, id).unwrap().reactions_per_round, 1);

        store
            .grants_mut(id)
            .unwrap()
            .grant_tag(COMBAT_REFLEXES, SourceId::new("feat:combat_reflexes"));
        assert_eq!(recalculate(&mut store, &config, id).unwrap().reactions_per_round, 4);
    }

    #[test]
    fn missing_attributes_is_reported() {
        let mut store = EntityStore::new();
        let id = store.spawn(Identity::new("Ghost", Faction::Hostile));
        let err = recalculate(&mut store, &CombatConfig::default(), id).unwrap_err();
        assert_eq!(
            err,
            StoreError::missing(id, crate::state::ComponentKind::Attributes)
        );
    }

    #[test]
    fn stat_paths_resolve() {
        let stats = ComputedStats {
            abilities: AbilityScores::new(14, 10, 10, 10, 10, 10),
            armor_class: 17,
            ..Default::default()
        };
        assert_eq!(stats.get("ac"), Some(17));
        assert_eq!(stats.get("abilities.str"), Some(14));
        assert_eq!(stats.get("abilities.str.mod"), Some(2));
        assert_eq!(stats.get("skills.climb"), None);
    }
}
