use super::{ActionCost, ActionError, ActionTraits, ActionTransition, require_living_target, require_reach};
use crate::combat::{AttackDeclaration, Maneuver, wielded_weapon};
use crate::engine::World;
use crate::events::GameEvent;
use crate::state::{EntityId, EquipSlot};
use crate::stats::paths;

/// A single attack with the wielded weapon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackAction {
    pub target: EntityId,
    /// Taken as an attack of opportunity, paid from reactions.
    pub opportunity: bool,
}

impl AttackAction {
    pub fn new(target: EntityId) -> Self {
        Self {
            target,
            opportunity: false,
        }
    }

    pub fn opportunity(target: EntityId) -> Self {
        Self {
            target,
            opportunity: true,
        }
    }
}

impl ActionTransition for AttackAction {
    fn name(&self) -> &'static str {
        "attack"
    }

    fn description(&self) -> &'static str {
        "Make one attack with the wielded weapon."
    }

    fn cost(&self) -> ActionCost {
        if self.opportunity {
            ActionCost::Reaction
        } else {
            ActionCost::Standard
        }
    }

    fn provokes(&self, world: &World, actor: EntityId) -> bool {
        // Firing or throwing in melee range provokes.
        !self.opportunity && wielded_weapon(world, actor).ranged
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        require_living_target(world, actor, self.target)?;
        require_reach(world, actor, self.target, wielded_weapon(world, actor).range)
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        let weapon = wielded_weapon(world, actor);
        world.publish(GameEvent::AttackDeclared(AttackDeclaration {
            attacker: actor,
            target: self.target,
            weapon,
            iterative_penalty: 0,
            opportunity: self.opportunity,
        }));
        Ok(())
    }
}

/// Every iterative attack the base attack bonus allows, at -5 each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullAttackAction {
    pub target: EntityId,
}

impl FullAttackAction {
    pub const MAX_ATTACKS: i32 = 4;

    pub fn attack_count(base_attack_bonus: i32) -> i32 {
        if base_attack_bonus <= 0 {
            return 1;
        }
        (1 + (base_attack_bonus - 1) / 5).min(Self::MAX_ATTACKS)
    }
}

impl ActionTransition for FullAttackAction {
    fn name(&self) -> &'static str {
        "full_attack"
    }

    fn description(&self) -> &'static str {
        "Spend the whole turn on iterative attacks against one target."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::FullRound
    }

    fn provokes(&self, world: &World, actor: EntityId) -> bool {
        wielded_weapon(world, actor).ranged
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        require_living_target(world, actor, self.target)?;
        require_reach(world, actor, self.target, wielded_weapon(world, actor).range)
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        let attacks = Self::attack_count(world.query_stat(actor, paths::BAB));
        for index in 0..attacks {
            if !world.entities.is_alive(actor) || !world.entities.is_alive(self.target) {
                break;
            }
            let weapon = wielded_weapon(world, actor);
            world.publish(GameEvent::AttackDeclared(AttackDeclaration {
                attacker: actor,
                target: self.target,
                weapon,
                iterative_penalty: -5 * index,
                opportunity: false,
            }));
        }
        Ok(())
    }
}

/// Grapple, trip, disarm, bull rush or feint against an adjacent target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManeuverAction {
    pub maneuver: Maneuver,
    pub target: EntityId,
}

impl ActionTransition for ManeuverAction {
    fn name(&self) -> &'static str {
        "maneuver"
    }

    fn description(&self) -> &'static str {
        "Attempt a combat maneuver decided by an opposed check."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Standard
    }

    fn traits(&self) -> ActionTraits {
        ActionTraits::MANEUVER | ActionTraits::MELEE
    }

    fn provokes(&self, world: &World, actor: EntityId) -> bool {
        self.maneuver.provokes() && !world.entities.has_tag(actor, &self.maneuver.improved_tag())
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        require_living_target(world, actor, self.target)?;
        require_reach(world, actor, self.target, 1)?;
        if self.maneuver == Maneuver::Disarm
            && world
                .entities
                .equipment(self.target)?
                .equipped(EquipSlot::MainHand)
                .is_none()
        {
            return Err(ActionError::InvalidTarget {
                target: self.target,
                reason: "nothing to disarm",
            });
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::ManeuverDeclared {
            attacker: actor,
            defender: self.target,
            maneuver: self.maneuver,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterative_attacks_follow_bab() {
        assert_eq!(FullAttackAction::attack_count(0), 1);
        assert_eq!(FullAttackAction::attack_count(5), 1);
        assert_eq!(FullAttackAction::attack_count(6), 2);
        assert_eq!(FullAttackAction::attack_count(11), 3);
        assert_eq!(FullAttackAction::attack_count(20), 4);
    }

    #[test]
    fn opportunity_attacks_cost_a_reaction() {
        assert_eq!(AttackAction::new(EntityId(1)).cost(), ActionCost::Standard);
        assert_eq!(AttackAction::opportunity(EntityId(1)).cost(), ActionCost::Reaction);
    }
}
