//! Action validation and execution errors.

use super::ActionCost;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, StoreError};

/// Reasons an action cannot be performed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("actor {0} is not alive")]
    ActorDead(EntityId),

    #[error("target {0} not found")]
    TargetNotFound(EntityId),

    /// Target exists but the action cannot be aimed at it.
    #[error("invalid target {target}: {reason}")]
    InvalidTarget {
        target: EntityId,
        reason: &'static str,
    },

    #[error("target {target} is {distance} squares away, reach is {reach}")]
    OutOfReach {
        target: EntityId,
        distance: u32,
        reach: u32,
    },

    #[error("it is not {0}'s turn")]
    NotYourTurn(EntityId),

    #[error("no {0} action left this turn")]
    InsufficientBudget(ActionCost),

    #[error("only possible during combat")]
    NotInCombat,

    #[error("item '{0}' is not carried")]
    ItemNotCarried(String),

    #[error("item '{0}' cannot be used this way")]
    WrongItemKind(String),

    /// A rule forbids the action in the current situation.
    #[error("rule violation: {0}")]
    RuleViolation(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfReach { .. } | Self::InsufficientBudget(_) | Self::NotYourTurn(_) => {
                ErrorSeverity::Recoverable
            }
            Self::Store(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorDead(_) => "ACTION_ACTOR_DEAD",
            Self::TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            Self::InvalidTarget { .. } => "ACTION_INVALID_TARGET",
            Self::OutOfReach { .. } => "ACTION_OUT_OF_REACH",
            Self::NotYourTurn(_) => "ACTION_NOT_YOUR_TURN",
            Self::InsufficientBudget(_) => "ACTION_INSUFFICIENT_BUDGET",
            Self::NotInCombat => "ACTION_NOT_IN_COMBAT",
            Self::ItemNotCarried(_) => "ACTION_ITEM_NOT_CARRIED",
            Self::WrongItemKind(_) => "ACTION_WRONG_ITEM_KIND",
            Self::RuleViolation(_) => "ACTION_RULE_VIOLATION",
            Self::Store(err) => err.error_code(),
        }
    }
}
