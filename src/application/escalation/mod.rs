//! Crisis alert escalation.

mod service;

pub use service::{EscalationService, EscalationServiceConfig};
