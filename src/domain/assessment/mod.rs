//! Assessment - pure scoring, flag detection, triage and adaptive sequencing.
//!
//! Everything here is a synchronous function over an immutable answer
//! snapshot. No ports, no I/O, no shared mutable state; any number of
//! callers may use these concurrently.
//!
//! # Components
//!
//! - `Scorer` - totals, domain breakdown, severity band
//! - `FlagDetector` - table-driven risk rules
//! - `TriageResolver` - severity + flags to a care pathway
//! - `QuestionSequence` - session-local adaptive follow-up splicing

mod adaptive;
mod answers;
mod flags;
mod scorer;
mod severity;
mod triage;

pub use adaptive::{AdaptiveAdjustment, QuestionSequence};
pub use answers::{AnswerSet, IncompleteAnswerSet};
pub use flags::{FlagDetector, RiskFlag};
pub use scorer::{DeepScreeningResult, DomainScoreBreakdown, Scorer, ShortScreeningResult};
pub use severity::Severity;
pub use triage::{TriageLevel, TriageOutcome, TriageResolver};

pub use crate::domain::catalog::Answer;
