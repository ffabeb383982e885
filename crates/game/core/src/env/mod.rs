//! Read-only inputs to the engine: content records and dice.
mod content;
mod error;
mod rng;

pub use content::{
    ArmorData, BonusDefinition, ClassDefinition, ContentCatalog, ContentOracle, EffectDefinition,
    FeatDefinition, ItemDefinition, ItemKind, ProgressionEntry, RaceDefinition, WeaponData,
};
pub use error::ContentError;
pub use rng::{DiceExpr, DiceRoller, PcgDice, ScriptedDice};
