//! Stat system: typed modifiers, the per-entity ledger and the derived-stat
//! pipeline.
//!
//! ```text
//! [ Modifier ] --add--> [ ModifierLedger ] --totals--> [ pipeline ] --> ComputedStats
//! ```
//!
//! Ledger writes never recompute anything by themselves. Callers that change
//! a ledger (effects, equipment, spawning) ask the world to recalculate the
//! entity afterwards.
mod abilities;
mod modifiers;
pub mod paths;
mod pipeline;
mod progression;

pub use abilities::{Ability, AbilityScores, ability_modifier};
pub use modifiers::{LedgerError, Modifier, ModifierKind, ModifierLedger, SourceId, stacked_total};
pub use pipeline::{COMBAT_REFLEXES, ComputedStats, FLAT_FOOTED, compute, recalculate};
pub use progression::{BabProgression, SaveProgression};
