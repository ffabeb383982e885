//! The world: every subsystem wired together.
//!
//! [`World`] is the explicit context the rest of the crate passes around. It
//! owns the entity store, the event bus, the behavior registry, the grid, the
//! turn state and the action stack, plus the content oracle and dice it was
//! built with.
//!
//! Publishing is synchronous. A handler can publish further events, which are
//! delivered depth-first before the outer publish returns.
mod interrupts;
mod spawn;
mod stack;
mod turns;

pub use interrupts::ReadiedAction;
pub use spawn::{CharacterSpec, SpawnError};
pub use stack::{ActionOrigin, QueuedAction};
pub use turns::{CombatPhase, InitiativeEntry, TurnError};

use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{error, trace, warn};

use crate::combat;
use crate::config::CombatConfig;
use crate::effects::EffectBehaviorRegistry;
use crate::env::{ContentOracle, DiceExpr, DiceRoller};
use crate::error::GameError;
use crate::events::{EventBus, EventEnvelope, EventKind, GameEvent, SubscriberId};
use crate::state::{BattleGrid, EntityId, EntityStore};
use crate::stats::{self, Ability, ComputedStats, paths};

use interrupts::ReadiedTable;
use turns::TurnState;

pub struct World {
    pub entities: EntityStore,
    pub events: EventBus,
    pub behaviors: EffectBehaviorRegistry,
    pub grid: BattleGrid,
    config: CombatConfig,
    content: Rc<dyn ContentOracle>,
    dice: Box<dyn DiceRoller>,
    turns: TurnState,
    stack: VecDeque<QueuedAction>,
    readied: ReadiedTable,
    item_instances: u32,
}

impl World {
    /// Builds a world with the rules and engine handlers subscribed and the
    /// built-in effect behaviors registered.
    pub fn new(config: CombatConfig, content: Rc<dyn ContentOracle>, dice: Box<dyn DiceRoller>) -> Self {
        let mut events = EventBus::new(config.record_events);
        combat::register(&mut events);
        register_engine(&mut events);
        Self {
            entities: EntityStore::new(),
            events,
            behaviors: EffectBehaviorRegistry::with_builtin(),
            grid: BattleGrid::new(config.grid_width, config.grid_height),
            config,
            content,
            dice,
            turns: TurnState::default(),
            stack: VecDeque::new(),
            readied: ReadiedTable::default(),
            item_instances: 0,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn content(&self) -> &dyn ContentOracle {
        self.content.as_ref()
    }

    /// Shared handle to the content, for callers that outlive a borrow.
    pub fn content_handle(&self) -> Rc<dyn ContentOracle> {
        Rc::clone(&self.content)
    }

    pub fn roll_d20(&mut self) -> u32 {
        self.dice.roll_d20()
    }

    /// Sum of the dice in `expr`; its flat bonus is left to the caller.
    pub fn roll_dice(&mut self, expr: &DiceExpr) -> i32 {
        self.dice.roll_dice(expr)
    }

    /// Delivers `event` to the readied actions watching for it, then to every
    /// subscribed handler in subscription order.
    ///
    /// A failing handler is logged and skipped. Past the configured nesting
    /// depth the event is dropped and comes back cancelled.
    pub fn publish(&mut self, event: GameEvent) -> EventEnvelope {
        let depth = self.events.depth();
        let kind = event.kind();
        if !self.events.enter(self.config.max_event_depth) {
            error!(target: "tactics::events", %kind, depth, "event dropped: nesting too deep");
            let mut envelope = EventEnvelope::new(event, depth);
            envelope.cancel();
            return envelope;
        }
        trace!(target: "tactics::events", %kind, depth, "publish");
        self.events.record(&event);
        let mut envelope = EventEnvelope::new(event, depth);

        self.fire_readied(&envelope.event);
        for handler in self.events.snapshot(kind) {
            if let Err(err) = handler.handle(self, &mut envelope) {
                warn!(
                    target: "tactics::events",
                    %kind,
                    handler = handler.name(),
                    code = err.error_code(),
                    error = %err,
                    "handler failed"
                );
            }
        }
        self.events.leave();
        envelope
    }

    /// Recomputes derived stats. Logs and returns `None` when the entity
    /// lacks the components the pipeline needs.
    pub fn recalculate(&mut self, id: EntityId) -> Option<ComputedStats> {
        match stats::recalculate(&mut self.entities, &self.config, id) {
            Ok(computed) => {
                self.publish(GameEvent::StatsCalculated { entity: id });
                Some(computed)
            }
            Err(err) => {
                warn!(
                    target: "tactics::stats",
                    entity = %id,
                    code = err.error_code(),
                    error = %err,
                    "stats not recalculated"
                );
                None
            }
        }
    }

    /// Reads a stat by path: a derived stat if the path names one, current
    /// hit points for `hit_points.current`, otherwise the raw ledger total.
    /// Unknown entities read as 0.
    pub fn query_stat(&self, id: EntityId, path: &str) -> i32 {
        if path == paths::CURRENT_HIT_POINTS {
            if let Ok(health) = self.entities.health(id) {
                return health.current;
            }
        }
        if let Some(value) = self
            .entities
            .stats(id)
            .ok()
            .and_then(|computed| computed.get(path))
        {
            return value;
        }
        match self.entities.ledger(id) {
            Ok(ledger) => ledger.total(path),
            Err(err) => {
                warn!(target: "tactics::stats", entity = %id, path, error = %err, "stat query on missing entity");
                0
            }
        }
    }

    pub fn ability_modifier(&self, id: EntityId, ability: Ability) -> i32 {
        self.entities
            .stats(id)
            .map(|computed| computed.modifier(ability))
            .unwrap_or(0)
    }

    pub fn is_hostile(&self, a: EntityId, b: EntityId) -> bool {
        match (self.entities.identity(a), self.entities.identity(b)) {
            (Ok(left), Ok(right)) => left.faction.is_hostile_to(&right.faction),
            _ => false,
        }
    }

    pub(crate) fn next_item_instance(&mut self, item_id: &str) -> stats::SourceId {
        self.item_instances += 1;
        stats::SourceId::new(format!("item:{item_id}#{}", self.item_instances))
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("events", &self.events)
            .field("behaviors", &self.behaviors)
            .field("phase", &self.turns.phase())
            .field("pending", &self.stack.len())
            .finish()
    }
}

/// Turn and interrupt bookkeeping that reacts to rules events.
fn register_engine(bus: &mut EventBus) {
    bus.subscribe_fn(
        EventKind::TurnEnded,
        SubscriberId::Engine,
        "engine.tick_effects",
        |world, envelope| {
            if let GameEvent::TurnEnded { actor, .. } = envelope.event {
                world.tick_effects(actor);
            }
            Ok(())
        },
    );
    bus.subscribe_fn(
        EventKind::CharacterDied,
        SubscriberId::Engine,
        "engine.remove_fallen",
        |world, envelope| {
            if let GameEvent::CharacterDied { entity, .. } = envelope.event {
                world.readied.remove_actor(entity);
                world.remove_combatant(entity);
            }
            Ok(())
        },
    );
    bus.subscribe_fn(
        EventKind::ReadyDeclared,
        SubscriberId::Engine,
        "engine.register_readied",
        |world, envelope| {
            if envelope.is_cancelled() {
                return Ok(());
            }
            if let GameEvent::ReadyDeclared {
                actor,
                trigger,
                watch,
                action,
            } = &envelope.event
            {
                world.readied.register(ReadiedAction {
                    actor: *actor,
                    trigger: *trigger,
                    watch: *watch,
                    action: action.as_ref().clone(),
                });
            }
            Ok(())
        },
    );
}
