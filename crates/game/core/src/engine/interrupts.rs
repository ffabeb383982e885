//! Readied actions and attack-of-opportunity eligibility.
use std::collections::BTreeMap;

use tracing::debug;

use super::{ActionOrigin, QueuedAction, World};
use crate::action::Action;
use crate::combat::wielded_weapon;
use crate::events::{EventKind, GameEvent};
use crate::state::EntityId;

/// An action held until an event of kind `trigger` is published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadiedAction {
    pub actor: EntityId,
    pub trigger: EventKind,
    /// Only events whose subject is this entity fire the action.
    pub watch: Option<EntityId>,
    pub action: Action,
}

impl ReadiedAction {
    fn fires_on(&self, subject: Option<EntityId>) -> bool {
        if subject == Some(self.actor) {
            return false;
        }
        match self.watch {
            Some(watched) => subject == Some(watched),
            None => true,
        }
    }
}

/// Readied actions keyed by the event kind that fires them.
#[derive(Debug, Default)]
pub(crate) struct ReadiedTable {
    by_trigger: BTreeMap<EventKind, Vec<ReadiedAction>>,
}

impl ReadiedTable {
    /// Registers `readied`, replacing anything its actor already held.
    pub(crate) fn register(&mut self, readied: ReadiedAction) {
        self.remove_actor(readied.actor);
        debug!(
            target: "tactics::interrupts",
            actor = %readied.actor,
            trigger = %readied.trigger,
            action = readied.action.name(),
            "action readied"
        );
        self.by_trigger
            .entry(readied.trigger)
            .or_default()
            .push(readied);
    }

    /// Removes and returns the registrations that fire on this event.
    pub(crate) fn take_triggered(&mut self, kind: EventKind, subject: Option<EntityId>) -> Vec<ReadiedAction> {
        let Some(waiting) = self.by_trigger.get_mut(&kind) else {
            return Vec::new();
        };
        let (fired, kept): (Vec<_>, Vec<_>) = std::mem::take(waiting)
            .into_iter()
            .partition(|readied| readied.fires_on(subject));
        if kept.is_empty() {
            self.by_trigger.remove(&kind);
        } else {
            self.by_trigger.insert(kind, kept);
        }
        fired
    }

    pub(crate) fn remove_actor(&mut self, actor: EntityId) -> Vec<ReadiedAction> {
        let mut removed = Vec::new();
        self.by_trigger.retain(|_, waiting| {
            let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(waiting)
                .into_iter()
                .partition(|readied| readied.actor == actor);
            removed.extend(gone);
            *waiting = kept;
            !waiting.is_empty()
        });
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.by_trigger.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ReadiedAction> {
        self.by_trigger.values().flatten()
    }
}

impl World {
    pub fn readied_actions(&self) -> impl Iterator<Item = &ReadiedAction> {
        self.readied.iter()
    }

    /// Combatants able to take an attack of opportunity against `provoker`,
    /// in initiative order: alive, hostile, adjacent, holding a melee weapon
    /// and with a reaction left this round.
    pub fn eligible_reactors(&self, provoker: EntityId) -> Vec<EntityId> {
        let Ok(at) = self.entities.position(provoker) else {
            return Vec::new();
        };
        self.initiative_order()
            .iter()
            .map(|entry| entry.entity)
            .filter(|&reactor| reactor != provoker)
            .filter(|&reactor| self.entities.is_alive(reactor))
            .filter(|&reactor| self.is_hostile(reactor, provoker))
            .filter(|&reactor| {
                self.entities
                    .position(reactor)
                    .is_ok_and(|position| position.is_adjacent(at))
            })
            .filter(|&reactor| {
                self.entities
                    .budget(reactor)
                    .is_ok_and(|budget| budget.reactions > 0)
            })
            .filter(|&reactor| !wielded_weapon(self, reactor).ranged)
            .collect()
    }

    /// Queues every readied action the event fires, each resolving before
    /// the event's own handlers run.
    pub(super) fn fire_readied(&mut self, event: &GameEvent) {
        let kind = event.kind();
        let fired = self.readied.take_triggered(kind, event.subject());
        for readied in fired {
            if !self.entities.is_alive(readied.actor) {
                continue;
            }
            debug!(
                target: "tactics::interrupts",
                actor = %readied.actor,
                trigger = %kind,
                "readied action fires"
            );
            self.publish(GameEvent::ReadiedActionTriggered {
                actor: readied.actor,
                trigger: kind,
            });
            self.add_interrupt(QueuedAction::new(
                readied.actor,
                readied.action,
                ActionOrigin::Readied,
            ));
        }
    }

    /// Drops `actor`'s unused readied action at the start of its turn.
    pub(super) fn expire_readied(&mut self, actor: EntityId) {
        for readied in self.readied.remove_actor(actor) {
            debug!(
                target: "tactics::interrupts",
                %actor,
                trigger = %readied.trigger,
                "readied action expired"
            );
            self.publish(GameEvent::ReadiedActionExpired {
                actor,
                trigger: readied.trigger,
            });
        }
    }
}
