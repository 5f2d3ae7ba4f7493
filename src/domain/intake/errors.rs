//! Intake errors.

use thiserror::Error;

use super::stage::IntakeStage;
use crate::domain::assessment::IncompleteAnswerSet;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    /// Stage completion rejected; lists the offending question ids.
    #[error(transparent)]
    Validation(#[from] IncompleteAnswerSet),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("cannot {action} while session is in {stage}")]
    WrongStage {
        action: &'static str,
        stage: IntakeStage,
    },

    #[error("session already completed: {0}")]
    Completed(SessionId),

    #[error("storage error: {0}")]
    Storage(String),
}

impl IntakeError {
    pub fn wrong_stage(action: &'static str, stage: IntakeStage) -> Self {
        IntakeError::WrongStage { action, stage }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            IntakeError::Validation(_) => ErrorCode::IncompleteAnswerSet,
            IntakeError::InvalidInput(_) => ErrorCode::ValidationFailed,
            IntakeError::NotFound(_) => ErrorCode::SessionNotFound,
            IntakeError::WrongStage { .. } => ErrorCode::InvalidStateTransition,
            IntakeError::Completed(_) => ErrorCode::SessionCompleted,
            IntakeError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<DomainError> for IntakeError {
    fn from(err: DomainError) -> Self {
        IntakeError::Storage(err.to_string())
    }
}
