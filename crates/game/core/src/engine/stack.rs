//! The action stack.
//!
//! Submitted actions and interrupts are pushed on the front and popped from
//! the front, so the newest entry always runs first. Each drain only runs
//! the entries pushed since it started, which lets an interrupt drain inside
//! another action's resolution without touching what was queued before it.
//!
//! A provoking action is parked behind the attacks of opportunity it grants:
//!
//! ```text
//! [move]  ─►  [aoo(r1), aoo(r2), move*]  ─►  ... r1 swings, r2 swings, then move* runs
//! ```
use tracing::{debug, warn};

use super::World;
use crate::action::{Action, ActionCost, ActionError, ActionTraits, AttackAction};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::state::EntityId;

/// Why an action is on the stack; decides which budget pays for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActionOrigin {
    /// Taken by the current actor on its own turn.
    Turn,
    /// An attack of opportunity, paid from reactions.
    Reaction,
    /// A readied action firing; already paid for when it was readied.
    Readied,
    /// Injected by the caller outside the turn economy.
    Interrupt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedAction {
    pub actor: EntityId,
    pub action: Action,
    pub origin: ActionOrigin,
    /// Set on the continuation of a provoking action once its reactions are
    /// queued, so it does not provoke twice.
    pub provocation_resolved: bool,
}

impl QueuedAction {
    pub fn new(actor: EntityId, action: Action, origin: ActionOrigin) -> Self {
        Self {
            actor,
            action,
            origin,
            provocation_resolved: false,
        }
    }

    fn cost(&self) -> ActionCost {
        match self.origin {
            ActionOrigin::Turn => self.action.cost(),
            ActionOrigin::Reaction => ActionCost::Reaction,
            ActionOrigin::Readied | ActionOrigin::Interrupt => ActionCost::Free,
        }
    }
}

impl World {
    /// Runs `action` for `actor` along with every reaction it causes.
    ///
    /// Returns false, after logging and publishing `ActionRejected`, when the
    /// action fails its checks; nothing is queued in that case. Once the
    /// stack is drained, the turn advances if the action ended it.
    pub fn submit_action(&mut self, actor: EntityId, action: Action) -> bool {
        let checked = action.check(self, actor).and_then(|_| {
            let limited = !matches!(action, Action::EndTurn(_));
            if limited && self.is_combat_active() && self.turns.actions_taken >= self.config().max_actions_per_turn {
                Err(ActionError::RuleViolation("action limit for this turn reached"))
            } else {
                Ok(())
            }
        });
        if let Err(err) = checked {
            self.reject(actor, &action, &err);
            return false;
        }
        if self.is_combat_active() {
            self.turns.actions_taken += 1;
        }

        let base = self.stack.len();
        self.stack
            .push_front(QueuedAction::new(actor, action, ActionOrigin::Turn));
        self.drain_stack(base);

        if self.turns.needs_advance() {
            self.advance_turn();
        }
        true
    }

    /// Pushes `queued` on top of the stack and runs it, with anything it
    /// causes, before returning. Called from outside any event delivery, it
    /// also moves the turn on when the interrupt felled the current actor.
    pub fn add_interrupt(&mut self, queued: QueuedAction) {
        let base = self.stack.len();
        self.stack.push_front(queued);
        self.drain_stack(base);

        if self.events.depth() == 0 && self.stack.is_empty() && self.turns.needs_advance() {
            self.advance_turn();
        }
    }

    /// Entries still waiting on the stack.
    pub fn pending_actions(&self) -> usize {
        self.stack.len()
    }

    fn drain_stack(&mut self, base: usize) {
        while self.stack.len() > base {
            let Some(queued) = self.stack.pop_front() else {
                break;
            };
            self.run_queued(queued);
        }
    }

    fn run_queued(&mut self, queued: QueuedAction) {
        let actor = queued.actor;
        if !self.entities.is_alive(actor) {
            debug!(target: "tactics::stack", %actor, action = queued.action.name(), "dropped: actor is down");
            return;
        }
        let in_combat = self.is_combat_active();
        if in_combat && queued.origin == ActionOrigin::Turn && self.current_actor() != Some(actor) {
            self.reject(actor, &queued.action, &ActionError::NotYourTurn(actor));
            return;
        }
        if let Err(err) = queued.action.validate(self, actor) {
            self.reject(actor, &queued.action, &err);
            return;
        }
        let cost = queued.cost();
        if in_combat {
            let affordable = self
                .entities
                .budget(actor)
                .is_ok_and(|budget| budget.can_afford(cost));
            if !affordable {
                self.reject(actor, &queued.action, &ActionError::InsufficientBudget(cost));
                return;
            }
        }

        if in_combat
            && !queued.provocation_resolved
            && queued.origin != ActionOrigin::Reaction
            && queued.action.provokes(self, actor)
            && self.queue_reactions(&queued)
        {
            return;
        }

        debug!(
            target: "tactics::stack",
            %actor,
            action = queued.action.name(),
            origin = %queued.origin,
            %cost,
            "executing"
        );
        let charge = in_combat.then_some(cost);
        if let Err(err) = self.run_charged(actor, charge, |world| queued.action.execute(world, actor)) {
            self.reject(actor, &queued.action, &err);
            return;
        }

        if in_combat
            && queued.origin == ActionOrigin::Turn
            && queued.action.traits().contains(ActionTraits::ENDS_TURN)
        {
            self.turns.turn_over = true;
        }
        self.check_combat_end();
    }

    /// Spends `charge` from the actor's budget and runs `execute`. A failed
    /// execution gives the budget back as it was.
    fn run_charged(
        &mut self,
        actor: EntityId,
        charge: Option<ActionCost>,
        execute: impl FnOnce(&mut World) -> Result<(), ActionError>,
    ) -> Result<(), ActionError> {
        let before = match charge {
            Some(cost) => self.entities.budget_mut(actor).ok().map(|budget| {
                let before = *budget;
                budget.spend(cost);
                before
            }),
            None => None,
        };
        let result = execute(self);
        if result.is_err() {
            if let (Some(before), Ok(budget)) = (before, self.entities.budget_mut(actor)) {
                *budget = before;
            }
        }
        result
    }

    /// Parks `queued` behind an attack of opportunity from every eligible
    /// reactor. Returns false when nobody can react.
    fn queue_reactions(&mut self, queued: &QueuedAction) -> bool {
        let provoker = queued.actor;
        let reactors = self.eligible_reactors(provoker);
        if reactors.is_empty() {
            return false;
        }
        debug!(
            target: "tactics::stack",
            %provoker,
            action = queued.action.name(),
            reactors = reactors.len(),
            "provoked"
        );
        self.publish(GameEvent::ReactionOpportunity {
            provoker,
            reactors: reactors.clone(),
            action: queued.action.name(),
        });
        if !self.is_combat_active() {
            return true;
        }

        let mut continuation = queued.clone();
        continuation.provocation_resolved = true;
        self.stack.push_front(continuation);
        for &reactor in reactors.iter().rev() {
            self.stack.push_front(QueuedAction::new(
                reactor,
                Action::Attack(AttackAction::opportunity(provoker)),
                ActionOrigin::Reaction,
            ));
        }
        true
    }

    fn reject(&mut self, actor: EntityId, action: &Action, err: &ActionError) {
        warn!(
            target: "tactics::stack",
            %actor,
            action = action.name(),
            code = err.error_code(),
            error = %err,
            "action rejected"
        );
        self.publish(GameEvent::ActionRejected {
            actor,
            action: action.name(),
            reason: err.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{CombatConfig, ContentCatalog, Faction, Identity, ScriptedDice};

    fn world_with_one() -> (World, EntityId) {
        let mut world = World::new(
            CombatConfig::default(),
            Rc::new(ContentCatalog::new()),
            Box::new(ScriptedDice::new([])),
        );
        let id = world.entities.spawn(Identity::new("Seelah", Faction::Player));
        (world, id)
    }

    #[test]
    fn failed_execution_costs_nothing() {
        let (mut world, id) = world_with_one();
        let result = world.run_charged(id, Some(ActionCost::Standard), |_| {
            Err(ActionError::RuleViolation("fizzled"))
        });

        assert!(result.is_err());
        assert_eq!(world.entities.budget(id).unwrap().standard, 1);
    }

    #[test]
    fn successful_execution_is_paid_for() {
        let (mut world, id) = world_with_one();
        world
            .run_charged(id, Some(ActionCost::Standard), |_| Ok(()))
            .unwrap();
        assert_eq!(world.entities.budget(id).unwrap().standard, 0);

        world.run_charged(id, None, |_| Ok(())).unwrap();
        assert_eq!(world.entities.budget(id).unwrap().movement, 1);
    }
}
