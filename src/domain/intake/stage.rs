//! IntakeStage - where a session is in the staged intake.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::Stage;
use crate::domain::foundation::StateMachine;

/// Lifecycle of an assessment session.
///
/// History -> Short -> (Deep) -> ReadyForReport -> Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    #[default]
    History,
    Short,
    /// Deep screening triggered and pending.
    Deep,
    /// Every required stage done, or deep screening skipped.
    ReadyForReport,
    /// Final report generated.
    Completed,
}

impl IntakeStage {
    /// The questionnaire stage collecting answers, if any.
    pub fn collecting(&self) -> Option<Stage> {
        match self {
            IntakeStage::History => Some(Stage::History),
            IntakeStage::Short => Some(Stage::Short),
            IntakeStage::Deep => Some(Stage::Deep),
            IntakeStage::ReadyForReport | IntakeStage::Completed => None,
        }
    }
}

impl StateMachine for IntakeStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        use IntakeStage::*;
        matches!(
            (self, target),
            (History, Short)
                | (Short, Deep)
                | (Short, ReadyForReport)
                | (Deep, ReadyForReport)
                | (ReadyForReport, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use IntakeStage::*;
        match self {
            History => vec![Short],
            Short => vec![Deep, ReadyForReport],
            Deep => vec![ReadyForReport],
            ReadyForReport => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntakeStage::History => "history",
            IntakeStage::Short => "short",
            IntakeStage::Deep => "deep",
            IntakeStage::ReadyForReport => "ready_for_report",
            IntakeStage::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}
