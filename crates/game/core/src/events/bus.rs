//! Synchronous publish/subscribe bus with per-owner unsubscription.
//!
//! The bus only stores routes and the journal. Delivery happens in
//! [`crate::engine::World::publish`] because handlers need the whole world.
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::{EventEnvelope, EventKind, GameEvent};
use crate::action::ActionError;
use crate::effects::EffectError;
use crate::engine::World;
use crate::env::ContentError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, StoreError};
use crate::stats::SourceId;

/// Failure inside a handler. Logged by the publisher; delivery continues.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("event payload does not match handler: expected {0}")]
    UnexpectedPayload(EventKind),
}

impl GameError for HandlerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Store(err) => err.severity(),
            Self::Effect(err) => err.severity(),
            Self::Content(err) => err.severity(),
            Self::Action(err) => err.severity(),
            Self::UnexpectedPayload(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.error_code(),
            Self::Effect(err) => err.error_code(),
            Self::Content(err) => err.error_code(),
            Self::Action(err) => err.error_code(),
            Self::UnexpectedPayload(_) => "HANDLER_UNEXPECTED_PAYLOAD",
        }
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// Receives events of the kinds it was subscribed to.
pub trait EventHandler {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn handle(&self, world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult;
}

/// Adapter so closures can subscribe directly.
pub struct FnHandler<F> {
    name: &'static str,
    func: F,
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&mut World, &mut EventEnvelope) -> HandlerResult,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
        (self.func)(world, envelope)
    }
}

/// Who registered a subscription, so it can be removed as a group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubscriberId {
    /// Built-in rules resolution.
    Rules,
    /// Turn and interrupt bookkeeping.
    Engine,
    /// An effect behavior on one entity; removed with the effect.
    Effect(EntityId, SourceId),
    /// Anything outside the core crate.
    External(String),
}

#[derive(Clone)]
struct Subscription {
    owner: SubscriberId,
    handler: Rc<dyn EventHandler>,
}

/// Routing table from event kind to handlers, in subscription order.
pub struct EventBus {
    routes: HashMap<EventKind, Vec<Subscription>>,
    depth: usize,
    journal: Vec<GameEvent>,
    recording: bool,
}

impl EventBus {
    pub fn new(recording: bool) -> Self {
        Self {
            routes: HashMap::new(),
            depth: 0,
            journal: Vec::new(),
            recording,
        }
    }

    pub fn subscribe(&mut self, kind: EventKind, owner: SubscriberId, handler: Rc<dyn EventHandler>) {
        trace!(
            target: "tactics::events",
            %kind,
            owner = ?owner,
            handler = handler.name(),
            "subscribed"
        );
        self.routes
            .entry(kind)
            .or_default()
            .push(Subscription { owner, handler });
    }

    pub fn subscribe_fn<F>(&mut self, kind: EventKind, owner: SubscriberId, name: &'static str, func: F)
    where
        F: Fn(&mut World, &mut EventEnvelope) -> HandlerResult + 'static,
    {
        self.subscribe(kind, owner, Rc::new(FnHandler { name, func }));
    }

    /// Removes every subscription registered by `owner`.
    ///
    /// Returns how many were removed.
    pub fn unsubscribe(&mut self, owner: &SubscriberId) -> usize {
        let mut removed = 0;
        self.routes.retain(|_, subscriptions| {
            let before = subscriptions.len();
            subscriptions.retain(|subscription| &subscription.owner != owner);
            removed += before - subscriptions.len();
            !subscriptions.is_empty()
        });
        if removed > 0 {
            trace!(target: "tactics::events", owner = ?owner, removed, "unsubscribed");
        }
        removed
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.routes.get(&kind).map_or(0, Vec::len)
    }

    pub fn owner_count(&self, owner: &SubscriberId) -> usize {
        self.routes
            .values()
            .flatten()
            .filter(|subscription| &subscription.owner == owner)
            .count()
    }

    /// Handlers for `kind` as they are right now. Changes made during
    /// delivery apply from the next publish on.
    pub(crate) fn snapshot(&self, kind: EventKind) -> Vec<Rc<dyn EventHandler>> {
        self.routes
            .get(&kind)
            .map(|subscriptions| {
                subscriptions
                    .iter()
                    .map(|subscription| Rc::clone(&subscription.handler))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters one level of nested delivery. Returns false past `limit`.
    pub(crate) fn enter(&mut self, limit: usize) -> bool {
        if self.depth >= limit {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn record(&mut self, event: &GameEvent) {
        if self.recording {
            self.journal.push(event.clone());
        }
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    /// Every delivered event in publish order, outer events first.
    pub fn journal(&self) -> &[GameEvent] {
        &self.journal
    }

    pub fn drain_journal(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.journal)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("routes", &self.routes.len())
            .field("depth", &self.depth)
            .field("journal", &self.journal.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut World, _: &mut EventEnvelope) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn unsubscribe_removes_only_that_owner() {
        let mut bus = EventBus::default();
        let owner = SubscriberId::Effect(EntityId(0), SourceId::new("power_attack@feat"));
        let other = SubscriberId::Effect(EntityId(1), SourceId::new("power_attack@feat"));
        bus.subscribe_fn(EventKind::BeforeAttackRoll, owner.clone(), "a", noop);
        bus.subscribe_fn(EventKind::BeforeDamageRoll, owner.clone(), "b", noop);
        bus.subscribe_fn(EventKind::BeforeAttackRoll, other.clone(), "a", noop);
        bus.subscribe_fn(EventKind::BeforeAttackRoll, SubscriberId::Rules, "c", noop);

        assert_eq!(bus.owner_count(&owner), 2);
        assert_eq!(bus.unsubscribe(&owner), 2);
        assert_eq!(bus.owner_count(&other), 1);
        assert_eq!(bus.handler_count(EventKind::BeforeAttackRoll), 2);
        assert_eq!(bus.handler_count(EventKind::BeforeDamageRoll), 0);
        assert_eq!(bus.unsubscribe(&owner), 0);
    }

    #[test]
    fn depth_guard_refuses_past_limit() {
        let mut bus = EventBus::default();
        assert!(bus.enter(2));
        assert!(bus.enter(2));
        assert!(!bus.enter(2));
        bus.leave();
        assert!(bus.enter(2));
    }

    #[test]
    fn journal_respects_recording_flag() {
        let mut bus = EventBus::new(false);
        bus.record(&GameEvent::RoundStarted { round: 1 });
        assert!(bus.journal().is_empty());
        bus.set_recording(true);
        bus.record(&GameEvent::RoundStarted { round: 2 });
        assert_eq!(bus.drain_journal().len(), 1);
        assert!(bus.journal().is_empty());
    }
}
