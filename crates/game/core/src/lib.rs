//! Deterministic rules engine for turn-based tactical combat.
//!
//! `tactics-core` owns the canonical combat rules: the per-entity component
//! store, the typed modifier ledger, the two-phase stat pipeline, timed
//! effects, the synchronous event bus, and the turn and action stacks that
//! sequence every mutation. All state lives inside [`engine::World`]; outer
//! crates load content into it and submit [`action::Action`]s for actors.
//!
//! Every random outcome flows through a [`env::DiceRoller`], so replacing the
//! roller with [`env::ScriptedDice`] makes a whole encounter reproducible.
pub mod action;
pub mod combat;
pub mod config;
pub mod effects;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod state;
pub mod stats;

pub use action::{Action, ActionCost, ActionError, ActionTraits, ActionTransition, Maneuver};
pub use combat::{AttackOutcome, AttackReport};
pub use config::{CombatConfig, ReadiedExpiry};
pub use effects::{ActiveEffect, EffectBehavior, EffectBehaviorRegistry, EffectDuration, EffectError};
pub use engine::{
    ActionOrigin, CharacterSpec, CombatPhase, InitiativeEntry, QueuedAction, ReadiedAction,
    SpawnError, TurnError, World,
};
pub use env::{
    BonusDefinition, ClassDefinition, ContentCatalog, ContentError, ContentOracle, DiceExpr,
    DiceRoller, EffectDefinition, FeatDefinition, ItemDefinition, ItemKind, PcgDice,
    RaceDefinition, ScriptedDice,
};
pub use error::{ErrorSeverity, GameError};
pub use events::{EventBus, EventEnvelope, EventHandler, EventKind, GameEvent, HandlerError};
pub use state::{
    ActionBudget, BattleGrid, ComponentKind, Controller, EntityId, EntityStore,
    Equipment, Faction, Grants, Health, Identity, Position, StoreError,
};
pub use stats::{
    Ability, AbilityScores, ComputedStats, LedgerError, Modifier, ModifierKind, ModifierLedger, SourceId,
};
