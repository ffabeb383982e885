//! Timed and permanent effects on entities.
//!
//! An applied effect owns everything it created under one [`SourceId`]:
//! ledger modifiers, capability tags, bonus feat slots and bus subscriptions
//! of its behavior. Removing the effect removes all of them together.
mod behavior;
pub mod conditions;
mod lifecycle;

pub use behavior::{EffectBehavior, EffectBehaviorRegistry, PowerAttack, Thorns};

use crate::error::{ErrorSeverity, GameError};
use crate::events::SubscriberId;
use crate::state::{EntityId, StoreError};
use crate::stats::{LedgerError, Modifier, SourceId};

/// Remaining lifetime of an active effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectDuration {
    /// Decremented at each of the owner's turn ends; removed on reaching zero.
    Rounds(u32),
    Permanent,
}

impl EffectDuration {
    pub fn from_rounds(rounds: Option<u32>) -> Self {
        match rounds {
            Some(rounds) => Self::Rounds(rounds),
            None => Self::Permanent,
        }
    }

    /// Ages the effect by one turn. Returns true once it has run out.
    pub fn tick(&mut self) -> bool {
        match self {
            Self::Rounds(rounds) => {
                *rounds = rounds.saturating_sub(1);
                *rounds == 0
            }
            Self::Permanent => false,
        }
    }
}

/// An effect instance attached to one entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveEffect {
    pub source_id: SourceId,
    pub effect_id: String,
    pub name: String,
    pub owner: EntityId,
    pub applied_by: Option<EntityId>,
    pub duration: EffectDuration,
    /// Copies of the modifiers filed in the owner's ledger.
    pub modifiers: Vec<Modifier>,
    pub tags: Vec<String>,
    pub feat_slots: u32,
}

impl ActiveEffect {
    /// Bus owner for this effect's behavior handlers. Two entities carrying
    /// the same source id never share one.
    pub fn subscriber(&self) -> SubscriberId {
        SubscriberId::Effect(self.owner, self.source_id.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// Neither content nor the built-in conditions define this id.
    #[error("unknown effect '{0}'")]
    UnknownEffect(String),

    /// No effect with that source id is active on the target.
    #[error("effect '{source_id}' is not active on {target}")]
    NotActive { target: EntityId, source_id: SourceId },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl GameError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEffect(_) | Self::NotActive { .. } => ErrorSeverity::Validation,
            Self::Store(err) => err.severity(),
            Self::Ledger(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEffect(_) => "EFFECT_UNKNOWN",
            Self::NotActive { .. } => "EFFECT_NOT_ACTIVE",
            Self::Store(err) => err.error_code(),
            Self::Ledger(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_count_down_to_expiry() {
        let mut duration = EffectDuration::from_rounds(Some(2));
        assert!(!duration.tick());
        assert!(duration.tick());
        assert_eq!(duration, EffectDuration::Rounds(0));

        let mut permanent = EffectDuration::from_rounds(None);
        assert!(!permanent.tick());
    }
}
