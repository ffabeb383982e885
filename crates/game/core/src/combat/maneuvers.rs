//! Opposed-check maneuvers.
//!
//! Both sides roll d20 plus their bonus; the attacker must beat the defender,
//! so ties go to the defender.
use tracing::debug;

use super::movement::push;
use crate::effects::conditions::{FLAT_FOOTED, GRAPPLED, PRONE};
use crate::engine::World;
use crate::events::{EventEnvelope, EventKind, GameEvent, HandlerError, HandlerResult};
use crate::state::{EntityId, EquipSlot};
use crate::stats::{Ability, paths};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Maneuver {
    Grapple,
    Trip,
    Disarm,
    BullRush,
    Feint,
}

impl Maneuver {
    /// Whether attempting it provokes without the matching improved feat.
    pub fn provokes(self) -> bool {
        !matches!(self, Self::Feint)
    }

    /// Tag that lets the maneuver be attempted without provoking.
    pub fn improved_tag(self) -> String {
        format!("improved_{self}")
    }

    /// Bonuses added to each side's d20.
    pub fn check_bonuses(self, world: &World, attacker: EntityId, defender: EntityId) -> (i32, i32) {
        match self {
            Self::Feint => {
                let bluff = world.ability_modifier(attacker, Ability::Cha)
                    + world.query_stat(attacker, paths::BAB)
                    + world.query_stat(attacker, paths::BLUFF);
                let sense_motive = world.ability_modifier(defender, Ability::Wis)
                    + world.query_stat(defender, paths::BAB)
                    + world.query_stat(defender, paths::SENSE_MOTIVE);
                (bluff, sense_motive)
            }
            _ => (
                world.query_stat(attacker, paths::CMB),
                world.query_stat(defender, paths::CMB),
            ),
        }
    }
}

pub(super) fn on_maneuver_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::ManeuverDeclared {
        attacker,
        defender,
        maneuver,
    } = envelope.event
    else {
        return Err(HandlerError::UnexpectedPayload(EventKind::ManeuverDeclared));
    };
    if !world.entities.is_alive(attacker) || !world.entities.is_alive(defender) {
        return Ok(());
    }

    let (attacker_bonus, defender_bonus) = maneuver.check_bonuses(world, attacker, defender);
    let attacker_total = world.roll_d20() as i32 + attacker_bonus;
    let defender_total = world.roll_d20() as i32 + defender_bonus;
    let success = attacker_total > defender_total;
    debug!(
        target: "tactics::maneuver",
        %maneuver,
        %attacker,
        %defender,
        attacker_total,
        defender_total,
        success,
        "opposed check"
    );

    if success {
        on_success(world, maneuver, attacker, defender, attacker_total - defender_total)?;
    }
    world.publish(GameEvent::ManeuverResolved {
        attacker,
        defender,
        maneuver,
        success,
        attacker_total,
        defender_total,
    });
    Ok(())
}

fn on_success(
    world: &mut World,
    maneuver: Maneuver,
    attacker: EntityId,
    defender: EntityId,
    margin: i32,
) -> HandlerResult {
    let label = maneuver.to_string();
    match maneuver {
        Maneuver::Grapple => {
            world.try_apply_effect(GRAPPLED, defender, &label, Some(attacker))?;
            world.try_apply_effect(GRAPPLED, attacker, &label, Some(attacker))?;
        }
        Maneuver::Trip => {
            world.try_apply_effect(PRONE, defender, &label, Some(attacker))?;
        }
        Maneuver::Disarm => {
            world.try_unequip_slot(defender, EquipSlot::MainHand)?;
        }
        Maneuver::BullRush => {
            let squares = 1 + (margin / 5).max(0) as u32;
            push(world, defender, attacker, squares);
        }
        Maneuver::Feint => {
            world.try_apply_effect(FLAT_FOOTED, defender, &label, Some(attacker))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_feint_is_safe_to_attempt() {
        use strum::IntoEnumIterator;
        let provoking: Vec<Maneuver> = Maneuver::iter().filter(|m| m.provokes()).collect();
        assert_eq!(provoking.len(), 4);
        assert!(!Maneuver::Feint.provokes());
    }

    #[test]
    fn improved_tags_follow_names() {
        assert_eq!(Maneuver::BullRush.improved_tag(), "improved_bull_rush");
        assert_eq!("bull_rush".parse::<Maneuver>().ok(), Some(Maneuver::BullRush));
    }
}
