use super::{ActionCost, ActionError, ActionTraits, ActionTransition};
use crate::combat::MoveMode;
use crate::effects::conditions::PRONE;
use crate::engine::World;
use crate::events::GameEvent;
use crate::state::{EntityId, Position};

/// Walk along a path of adjacent squares, up to the actor's speed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveAction {
    /// Squares entered in order, excluding the starting square.
    pub path: Vec<Position>,
}

impl ActionTransition for MoveAction {
    fn name(&self) -> &'static str {
        "move"
    }

    fn description(&self) -> &'static str {
        "Move up to your speed."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Move
    }

    fn traits(&self) -> ActionTraits {
        ActionTraits::MOVEMENT | ActionTraits::PROVOKES
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        if self.path.is_empty() {
            return Err(ActionError::RuleViolation("empty path"));
        }
        world.entities.position(actor)?;
        if world.entities.has_tag(actor, PRONE) {
            return Err(ActionError::RuleViolation("must stand up before moving"));
        }
        if world.entities.budget(actor)?.stepped {
            return Err(ActionError::RuleViolation(
                "cannot move after a five-foot step",
            ));
        }
        let squares = world.entities.stats(actor)?.speed_squares();
        if self.path.len() as u32 > squares {
            return Err(ActionError::RuleViolation("path longer than speed"));
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::MoveDeclared {
            actor,
            path: self.path.clone(),
            mode: MoveMode::Walk,
        });
        Ok(())
    }
}

/// One square of careful movement that never provokes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiveFootStepAction {
    pub to: Position,
}

impl ActionTransition for FiveFootStepAction {
    fn name(&self) -> &'static str {
        "five_foot_step"
    }

    fn description(&self) -> &'static str {
        "Step one square without provoking, if you have not otherwise moved."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Free
    }

    fn traits(&self) -> ActionTraits {
        ActionTraits::MOVEMENT
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        let from = world.entities.position(actor)?;
        if !world.entities.budget(actor)?.can_step() {
            return Err(ActionError::RuleViolation(
                "five-foot step needs a turn without other movement",
            ));
        }
        if world.entities.has_tag(actor, PRONE) {
            return Err(ActionError::RuleViolation("must stand up before moving"));
        }
        if !from.is_adjacent(&self.to) {
            return Err(ActionError::RuleViolation("step must be to an adjacent square"));
        }
        if world.grid.is_difficult(&self.to) {
            return Err(ActionError::RuleViolation(
                "cannot step into difficult terrain",
            ));
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::MoveDeclared {
            actor,
            path: vec![self.to],
            mode: MoveMode::FiveFootStep,
        });
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandUpAction;

impl ActionTransition for StandUpAction {
    fn name(&self) -> &'static str {
        "stand_up"
    }

    fn description(&self) -> &'static str {
        "Rise from prone."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Move
    }

    fn traits(&self) -> ActionTraits {
        ActionTraits::MOVEMENT | ActionTraits::PROVOKES
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        if !world.entities.has_tag(actor, PRONE) {
            return Err(ActionError::RuleViolation("not prone"));
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::StandUpDeclared { actor });
        Ok(())
    }
}
