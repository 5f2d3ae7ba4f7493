//! AlertStatus - lifecycle of a crisis alert.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Escalation state of a crisis alert.
///
/// ```text
/// none -> active -> acknowledged -> { escalated | resolved | false_positive }
///           \-> escalated -> resolved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    None,
    Active,
    Acknowledged,
    Escalated,
    Resolved,
    FalsePositive,
}

impl AlertStatus {
    /// True while the escalation timer may still fire.
    pub fn awaits_acknowledgment(&self) -> bool {
        matches!(self, AlertStatus::Active)
    }

    /// True once the alert is closed by a human decision.
    pub fn is_closed(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::FalsePositive)
    }
}

impl StateMachine for AlertStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (AlertStatus::None, AlertStatus::Active)
                | (AlertStatus::Active, AlertStatus::Acknowledged)
                | (AlertStatus::Active, AlertStatus::Escalated)
                | (AlertStatus::Acknowledged, AlertStatus::Escalated)
                | (AlertStatus::Acknowledged, AlertStatus::Resolved)
                | (AlertStatus::Acknowledged, AlertStatus::FalsePositive)
                | (AlertStatus::Escalated, AlertStatus::Resolved)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            AlertStatus::None => vec![AlertStatus::Active],
            AlertStatus::Active => vec![AlertStatus::Acknowledged, AlertStatus::Escalated],
            AlertStatus::Acknowledged => vec![
                AlertStatus::Escalated,
                AlertStatus::Resolved,
                AlertStatus::FalsePositive,
            ],
            AlertStatus::Escalated => vec![AlertStatus::Resolved],
            AlertStatus::Resolved | AlertStatus::FalsePositive => vec![],
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertStatus::None => "none",
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Escalated => "escalated",
            AlertStatus::Resolved => "resolved",
            AlertStatus::FalsePositive => "false_positive",
        };
        write!(f, "{}", s)
    }
}
