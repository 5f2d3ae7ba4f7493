//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and event plumbing
//! that form the vocabulary of the intake and triage domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use crate::domain_event;
pub use ids::{AlertId, PatientRef, QuestionId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
