use super::{Action, ActionCost, ActionError, ActionTraits, ActionTransition};
use crate::engine::World;
use crate::events::{EventKind, GameEvent};
use crate::state::EntityId;

/// Prepare an action to fire when a triggering event happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyAction {
    pub trigger: EventKind,
    /// Only events whose subject is this entity trigger the action.
    pub watch: Option<EntityId>,
    pub action: Box<Action>,
}

impl ActionTransition for ReadyAction {
    fn name(&self) -> &'static str {
        "ready"
    }

    fn description(&self) -> &'static str {
        "Hold an action until a chosen event occurs."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Standard
    }

    fn validate(&self, world: &World, _actor: EntityId) -> Result<(), ActionError> {
        if !world.is_combat_active() {
            return Err(ActionError::NotInCombat);
        }
        match self.action.as_ref() {
            Action::Ready(_) | Action::FullAttack(_) | Action::EndTurn(_) => {
                Err(ActionError::RuleViolation("that action cannot be readied"))
            }
            prepared if prepared.cost() == ActionCost::FullRound => {
                Err(ActionError::RuleViolation("full-round actions cannot be readied"))
            }
            _ => Ok(()),
        }
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::ReadyDeclared {
            actor,
            trigger: self.trigger,
            watch: self.watch,
            action: self.action.clone(),
        });
        Ok(())
    }
}

/// +4 dodge bonus to AC until the actor's next turn ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TotalDefenseAction;

impl ActionTransition for TotalDefenseAction {
    fn name(&self) -> &'static str {
        "total_defense"
    }

    fn description(&self) -> &'static str {
        "Give up attacking to gain +4 dodge AC."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Standard
    }

    fn validate(&self, _world: &World, _actor: EntityId) -> Result<(), ActionError> {
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::DefenseDeclared { actor });
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndTurnAction;

impl ActionTransition for EndTurnAction {
    fn name(&self) -> &'static str {
        "end_turn"
    }

    fn description(&self) -> &'static str {
        "Finish the current turn."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Free
    }

    fn traits(&self) -> ActionTraits {
        ActionTraits::ENDS_TURN
    }

    fn validate(&self, world: &World, _actor: EntityId) -> Result<(), ActionError> {
        if !world.is_combat_active() {
            return Err(ActionError::NotInCombat);
        }
        Ok(())
    }

    fn execute(&self, _world: &mut World, _actor: EntityId) -> Result<(), ActionError> {
        Ok(())
    }
}
