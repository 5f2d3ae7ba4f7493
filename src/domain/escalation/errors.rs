//! Crisis alert errors.

use thiserror::Error;

use super::protocol::NotificationGroupId;
use super::status::AlertStatus;
use crate::domain::foundation::{AlertId, DomainError, ErrorCode};

/// Rule violations on a single alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("cannot move alert from {from} to {to}")]
    InvalidTransition { from: AlertStatus, to: AlertStatus },

    #[error("{0} is not a notification target of this alert")]
    UnknownGroup(NotificationGroupId),

    #[error("{action} requires a human actor while human-in-loop is set")]
    HumanActionRequired { action: &'static str },
}

impl AlertError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AlertError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            AlertError::UnknownGroup(_) => ErrorCode::ValidationFailed,
            AlertError::HumanActionRequired { .. } => ErrorCode::ValidationFailed,
        }
    }
}

/// Errors surfaced by the escalation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscalationError {
    #[error("alert not found: {0}")]
    NotFound(AlertId),

    #[error(transparent)]
    Alert(#[from] AlertError),
}

impl EscalationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EscalationError::NotFound(_) => ErrorCode::AlertNotFound,
            EscalationError::Alert(err) => err.code(),
        }
    }
}

impl From<EscalationError> for DomainError {
    fn from(err: EscalationError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
