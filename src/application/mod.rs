//! Application layer - services that coordinate the domain and the ports.
//!
//! - `protocol` - the protocol table in force and its background reloader
//! - `escalation` - crisis alert lifecycle, timers and notification
//! - `intake` - drives an assessment session through its stages

pub mod escalation;
pub mod intake;
pub mod protocol;

pub use escalation::{EscalationService, EscalationServiceConfig};
pub use intake::{IntakeOrchestrator, SubmitStageResult};
pub use protocol::{ProtocolRegistry, ProtocolReloader, ProtocolReloaderConfig, ReloadOutcome};
