//! Content access errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors raised while resolving or parsing content records.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// No record with that id exists in the catalog.
    #[error("{kind} '{id}' not found")]
    MissingRecord { kind: &'static str, id: String },

    /// Dice notation could not be parsed.
    #[error("invalid dice expression '{0}'")]
    InvalidDice(String),

    /// Two records of the same kind share an id.
    #[error("duplicate {kind} id '{id}'")]
    Duplicate { kind: &'static str, id: String },

    /// A content source could not be read or parsed.
    #[error("failed to load content from {source_name}: {message}")]
    Load {
        source_name: String,
        message: String,
    },
}

impl ContentError {
    pub fn missing(kind: &'static str, id: impl Into<String>) -> Self {
        Self::MissingRecord {
            kind,
            id: id.into(),
        }
    }
}

impl GameError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Load { .. } => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingRecord { .. } => "CONTENT_MISSING_RECORD",
            Self::InvalidDice(_) => "CONTENT_INVALID_DICE",
            Self::Duplicate { .. } => "CONTENT_DUPLICATE",
            Self::Load { .. } => "CONTENT_LOAD",
        }
    }
}
