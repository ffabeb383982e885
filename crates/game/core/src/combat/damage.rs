//! Damage rolls and hit point changes.
use tracing::{debug, info, trace, warn};

use super::{AttackContext, DamageContext};
use crate::engine::World;
use crate::events::GameEvent;
use crate::state::EntityId;
use crate::stats::{Ability, paths};

/// Rolls and applies the damage of a hit. Returns the amount dealt, or
/// `None` when a reactor cancelled the roll.
pub(super) fn resolve_damage(world: &mut World, attack: &AttackContext, critical: bool) -> Option<i32> {
    let melee = attack.is_melee();
    let ability_bonus = if melee {
        world
            .entities
            .stats(attack.attacker)
            .map(|stats| stats.modifier(Ability::Str))
            .unwrap_or(0)
    } else {
        0
    };
    let ledger_bonus = world
        .entities
        .ledger(attack.attacker)
        .map(|ledger| ledger.total(paths::DAMAGE))
        .unwrap_or(0);

    let context = DamageContext {
        attacker: attack.attacker,
        target: attack.target,
        dice: attack.weapon.damage,
        multiplier: if critical {
            attack.weapon.crit_multiplier.max(1)
        } else {
            1
        },
        ability_bonus,
        ledger_bonus,
        components: Vec::new(),
        critical,
        melee,
    };

    let envelope = world.publish(GameEvent::BeforeDamageRoll(context));
    if envelope.is_cancelled() {
        debug!(target: "tactics::damage", attacker = %attack.attacker, "damage cancelled before the roll");
        return None;
    }
    let GameEvent::BeforeDamageRoll(context) = envelope.into_event() else {
        return None;
    };

    let mut rolled = 0;
    for _ in 0..context.multiplier {
        rolled += world.roll_dice(&context.dice);
    }
    let amount = (rolled + context.flat_bonus()).max(1);
    trace!(
        target: "tactics::damage",
        dice = %context.dice,
        times = context.multiplier,
        rolled,
        flat = context.flat_bonus(),
        amount,
        "damage roll"
    );

    world.publish(GameEvent::DamageResolved {
        attacker: Some(context.attacker),
        target: context.target,
        amount,
        critical,
        melee,
    });
    apply_damage(world, context.target, amount, Some(context.attacker));
    Some(amount)
}

/// Subtracts `amount` from current hit points and announces the change.
///
/// Publishes `CharacterDied` when the entity drops from above zero to zero or
/// below. Returns the new current hit points, or `None` if the entity has no
/// health record.
pub fn apply_damage(
    world: &mut World,
    target: EntityId,
    amount: i32,
    source: Option<EntityId>,
) -> Option<i32> {
    let health = match world.entities.health_mut(target) {
        Ok(health) => health,
        Err(err) => {
            warn!(target: "tactics::damage", entity = %target, error = %err, "damage not applied");
            return None;
        }
    };
    let previous = health.current;
    health.current -= amount.max(0);
    let current = health.current;

    world.publish(GameEvent::HpChanged {
        entity: target,
        previous,
        current,
    });
    if previous > 0 && current <= 0 {
        info!(target: "tactics::damage", entity = %target, killer = ?source, "character died");
        world.publish(GameEvent::CharacterDied {
            entity: target,
            killer: source,
        });
    }
    Some(current)
}

/// Restores up to `amount` hit points without exceeding the maximum.
///
/// Returns the new current hit points.
pub fn heal(world: &mut World, target: EntityId, amount: i32) -> Option<i32> {
    let health = match world.entities.health_mut(target) {
        Ok(health) => health,
        Err(err) => {
            warn!(target: "tactics::damage", entity = %target, error = %err, "healing not applied");
            return None;
        }
    };
    let previous = health.current;
    health.current = (health.current + amount.max(0)).min(health.max.max(health.current));
    let current = health.current;
    if current != previous {
        world.publish(GameEvent::HpChanged {
            entity: target,
            previous,
            current,
        });
    }
    Some(current)
}
