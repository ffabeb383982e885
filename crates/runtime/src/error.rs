//! Unified error types surfaced by the runtime API.
use tactics_core::{ContentError, ErrorSeverity, GameError, SpawnError, TurnError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Turn(#[from] TurnError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Content(err) => err.severity(),
            Self::Spawn(err) => err.severity(),
            Self::Turn(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Content(err) => err.error_code(),
            Self::Spawn(err) => err.error_code(),
            Self::Turn(err) => err.error_code(),
        }
    }
}
