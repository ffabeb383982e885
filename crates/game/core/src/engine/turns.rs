//! Initiative, rounds and turns.
//!
//! ```text
//! Exploration ──start_combat──► Combat { round ► turn ► turn ► ... ► round ► ... }
//!      ▲                              │
//!      └──── no hostile pair left ────┘
//! ```
//!
//! The initiative order is FIFO over the round. The action stack (see
//! `stack.rs`) is a separate LIFO that interrupts push onto; the two never
//! share a queue.
use tracing::{debug, info, warn};

use super::World;
use crate::config::ReadiedExpiry;
use crate::effects::conditions::INCAPACITATING;
use crate::error::{ErrorSeverity, GameError};
use crate::events::GameEvent;
use crate::state::{EntityId, StoreError};
use crate::stats::paths;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CombatPhase {
    #[default]
    Exploration,
    Combat,
}

/// One combatant's slot in the initiative order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitiativeEntry {
    pub entity: EntityId,
    /// Natural roll plus initiative bonus.
    pub score: i32,
    pub roll: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("combat is already running")]
    AlreadyInCombat,

    #[error("no combat is running")]
    NotInCombat,

    #[error("no living combatants to start combat with")]
    NoCombatants,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyInCombat | Self::NotInCombat | Self::NoCombatants => {
                ErrorSeverity::Validation
            }
            Self::Store(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyInCombat => "TURN_ALREADY_IN_COMBAT",
            Self::NotInCombat => "TURN_NOT_IN_COMBAT",
            Self::NoCombatants => "TURN_NO_COMBATANTS",
            Self::Store(err) => err.error_code(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TurnState {
    phase: CombatPhase,
    order: Vec<InitiativeEntry>,
    /// Slot of the combatant whose turn is running or ending, or of the one
    /// that slid into it after that combatant was removed.
    index: usize,
    /// Combatant the turn at `index` was started for.
    holder: Option<EntityId>,
    round: u32,
    active: Option<EntityId>,
    pub(crate) turn_over: bool,
    pub(crate) actions_taken: usize,
}

impl TurnState {
    pub(crate) fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// True when the current turn should end once the stack is drained.
    pub(crate) fn needs_advance(&self) -> bool {
        self.phase == CombatPhase::Combat
            && (self.turn_over || (self.active.is_some() && self.holder_removed()))
    }

    /// The combatant the current slot was started for has left the order.
    fn holder_removed(&self) -> bool {
        match self.holder {
            Some(holder) => self.order.get(self.index).map(|entry| entry.entity) != Some(holder),
            None => false,
        }
    }

    /// Slot to look at for the next turn: the following one, or the same
    /// one when its holder was removed and someone slid into it.
    fn next_slot(&self) -> usize {
        if self.holder_removed() {
            self.index
        } else {
            self.index + 1
        }
    }
}

impl World {
    pub fn is_combat_active(&self) -> bool {
        self.turns.phase == CombatPhase::Combat
    }

    pub fn phase(&self) -> CombatPhase {
        self.turns.phase
    }

    /// Whose turn it is, while in combat.
    pub fn current_actor(&self) -> Option<EntityId> {
        if self.is_combat_active() {
            self.turns.active
        } else {
            None
        }
    }

    pub fn round(&self) -> u32 {
        self.turns.round
    }

    pub fn initiative_order(&self) -> &[InitiativeEntry] {
        &self.turns.order
    }

    /// Façade over [`World::try_start_combat`]. Returns false after logging
    /// when combat could not start.
    pub fn start_combat(&mut self, combatants: &[EntityId]) -> bool {
        match self.try_start_combat(combatants) {
            Ok(_) => true,
            Err(err) => {
                warn!(target: "tactics::turns", code = err.error_code(), error = %err, "combat not started");
                false
            }
        }
    }

    /// Rolls initiative for every living combatant, sorts the order and
    /// begins round one.
    ///
    /// Ties keep the order the combatants were given in.
    pub fn try_start_combat(&mut self, combatants: &[EntityId]) -> Result<Vec<InitiativeEntry>, TurnError> {
        if self.is_combat_active() {
            return Err(TurnError::AlreadyInCombat);
        }
        let mut order = Vec::with_capacity(combatants.len());
        for &entity in combatants {
            if !self.entities.is_alive(entity) {
                debug!(target: "tactics::turns", %entity, "not joining combat: down or unknown");
                continue;
            }
            if order.iter().any(|entry: &InitiativeEntry| entry.entity == entity) {
                continue;
            }
            let roll = self.roll_d20();
            let score = roll as i32 + self.query_stat(entity, paths::INITIATIVE);
            order.push(InitiativeEntry { entity, score, roll });
        }
        if order.is_empty() {
            return Err(TurnError::NoCombatants);
        }
        // Stable: equal scores keep their roll order.
        order.sort_by(|a, b| b.score.cmp(&a.score));

        self.turns = TurnState {
            phase: CombatPhase::Combat,
            order: order.clone(),
            ..Default::default()
        };
        info!(target: "tactics::turns", combatants = order.len(), "combat started");
        self.publish(GameEvent::CombatStarted {
            order: order.clone(),
        });
        if self.check_combat_end() {
            return Ok(order);
        }
        let first_slot = self.turns.order.len();
        self.begin_next_turn(first_slot);
        Ok(order)
    }

    /// Ends the current turn and starts the next combatant's.
    ///
    /// Returns whose turn it now is, or `None` if combat is not running or
    /// ended along the way.
    pub fn advance_turn(&mut self) -> Option<EntityId> {
        if !self.is_combat_active() {
            warn!(target: "tactics::turns", "advance_turn outside combat");
            return None;
        }
        let removed = self.turns.holder_removed();
        if let Some(actor) = self.turns.active.take() {
            if let Ok(budget) = self.entities.budget_mut(actor) {
                budget.end_turn();
            }
            if !removed {
                let round = self.turns.round;
                self.publish(GameEvent::TurnEnded { actor, round });
            }
        }
        if !self.is_combat_active() {
            return None;
        }
        // Handlers of TurnEnded may have removed the ending actor.
        let next = self.turns.next_slot();
        self.begin_next_turn(next)
    }

    /// Starts the first combatant at or after slot `next` that can act,
    /// wrapping into a new round as needed.
    fn begin_next_turn(&mut self, mut next: usize) -> Option<EntityId> {
        // At most two passes over the order; the caller may advance again.
        let limit = self.turns.order.len() * 2 + 1;
        for _ in 0..limit {
            if !self.is_combat_active() {
                return None;
            }
            if self.turns.order.is_empty() {
                self.end_combat();
                return None;
            }
            if next >= self.turns.order.len() {
                next = 0;
                self.start_round();
                if !self.is_combat_active() {
                    return None;
                }
            }
            self.turns.index = next;
            let actor = self.turns.order[next].entity;
            self.turns.holder = Some(actor);
            if self.begin_turn(actor) {
                return Some(actor);
            }
            // Skipping can remove combatants; only step past the slot if the
            // skipped actor still holds it.
            next = self.turns.next_slot();
        }
        warn!(target: "tactics::turns", round = self.turns.round, "no combatant could act");
        None
    }

    fn start_round(&mut self) {
        self.turns.round += 1;
        let round = self.turns.round;
        debug!(target: "tactics::turns", round, "round started");

        let cleared = self.grid.tick_round();
        if !cleared.is_empty() {
            debug!(target: "tactics::turns", squares = cleared.len(), "timed terrain expired");
        }
        let combatants: Vec<EntityId> = self.turns.order.iter().map(|entry| entry.entity).collect();
        for entity in combatants {
            let reactions = self
                .entities
                .stats(entity)
                .map(|stats| stats.reactions_per_round)
                .unwrap_or(1);
            if let Ok(budget) = self.entities.budget_mut(entity) {
                budget.start_round(reactions);
            }
        }
        self.publish(GameEvent::RoundStarted { round });
    }

    /// Resets the actor's budget and announces the turn. Returns false when
    /// the turn was skipped.
    fn begin_turn(&mut self, actor: EntityId) -> bool {
        self.turns.active = Some(actor);
        self.turns.turn_over = false;
        self.turns.actions_taken = 0;
        if let Ok(budget) = self.entities.budget_mut(actor) {
            budget.start_turn();
        }
        if self.config().readied_expiry == ReadiedExpiry::NextTurnStart {
            self.expire_readied(actor);
        }

        let round = self.turns.round;
        let skip_reason = if !self.entities.is_alive(actor) {
            Some("down".to_owned())
        } else {
            INCAPACITATING
                .iter()
                .find(|tag| self.entities.has_tag(actor, tag))
                .map(|tag| (*tag).to_owned())
        };
        if let Some(reason) = skip_reason {
            debug!(target: "tactics::turns", %actor, round, reason = %reason, "turn skipped");
            let alive = self.entities.is_alive(actor);
            self.publish(GameEvent::TurnSkipped { actor, reason });
            if let Ok(budget) = self.entities.budget_mut(actor) {
                budget.end_turn();
            }
            self.turns.active = None;
            // Conditions still wear off on a lost turn.
            if alive {
                self.publish(GameEvent::TurnEnded { actor, round });
            }
            return false;
        }

        debug!(target: "tactics::turns", %actor, round, "turn started");
        self.publish(GameEvent::TurnStarted { actor, round });
        if !self.is_combat_active() {
            return false;
        }
        if !self.entities.is_alive(actor) || self.turns.holder_removed() {
            debug!(target: "tactics::turns", %actor, round, "fell as the turn started");
            if let Ok(budget) = self.entities.budget_mut(actor) {
                budget.end_turn();
            }
            self.turns.active = None;
            return false;
        }
        true
    }

    /// Takes `entity` out of the initiative order, keeping the turn pointer
    /// on the right combatant, then checks whether combat is over.
    pub fn remove_combatant(&mut self, entity: EntityId) -> bool {
        let Some(slot) = self
            .turns
            .order
            .iter()
            .position(|entry| entry.entity == entity)
        else {
            return false;
        };
        self.turns.order.remove(slot);
        if slot < self.turns.index {
            self.turns.index -= 1;
        }
        debug!(target: "tactics::turns", %entity, remaining = self.turns.order.len(), "combatant removed");
        if self.is_combat_active() {
            self.check_combat_end();
        }
        true
    }

    /// Ends combat when no two living combatants are hostile to each other.
    pub(super) fn check_combat_end(&mut self) -> bool {
        if !self.is_combat_active() {
            return false;
        }
        let living: Vec<EntityId> = self
            .turns
            .order
            .iter()
            .map(|entry| entry.entity)
            .filter(|&entity| self.entities.is_alive(entity))
            .collect();
        let contested = living
            .iter()
            .any(|&a| living.iter().any(|&b| self.is_hostile(a, b)));
        if contested {
            return false;
        }
        self.end_combat();
        true
    }

    /// Clears the initiative order, pending actions and readied actions and
    /// returns to exploration.
    pub fn end_combat(&mut self) {
        if !self.is_combat_active() {
            return;
        }
        let rounds = self.turns.round;
        for entry in &self.turns.order {
            if let Ok(budget) = self.entities.budget_mut(entry.entity) {
                budget.end_turn();
            }
        }
        if let Some(actor) = self.turns.active {
            if let Ok(budget) = self.entities.budget_mut(actor) {
                budget.end_turn();
            }
        }
        self.turns = TurnState::default();
        self.stack.clear();
        self.readied.clear();
        info!(target: "tactics::turns", rounds, "combat ended");
        self.publish(GameEvent::CombatEnded { rounds });
    }
}
