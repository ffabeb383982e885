//! Entity store errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ComponentKind, EntityId};

/// Errors raised when reading or writing per-entity components.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Entity was never spawned or has been despawned.
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    /// Entity exists but lacks a component the operation needs.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: ComponentKind,
    },
}

impl StoreError {
    pub fn missing(entity: EntityId, component: ComponentKind) -> Self {
        Self::MissingComponent { entity, component }
    }
}

impl GameError for StoreError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEntity(_) => ErrorSeverity::Validation,
            Self::MissingComponent { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "STORE_UNKNOWN_ENTITY",
            Self::MissingComponent { .. } => "STORE_MISSING_COMPONENT",
        }
    }
}
