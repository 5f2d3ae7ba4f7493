//! Escalation - crisis alerts and the protocols that govern them.
//!
//! The alert aggregate enforces the state machine and the human-in-loop
//! rule. Timers and per-alert locking live in the application layer
//! (`EscalationService`), which is the only place time enters.

mod alert;
mod errors;
mod events;
mod protocol;
mod status;

pub use alert::{
    Actor, AlertAction, AlertHistoryEntry, AlertRequest, AlertTrigger, CrisisAlert, DeliveryState,
    NotificationTarget,
};
pub use errors::{AlertError, EscalationError};
pub use events::{
    CrisisAlertAcknowledged, CrisisAlertClosed, CrisisAlertEscalated, CrisisAlertRaised,
    ProtocolMissing,
};
pub use protocol::{
    AlertType, NotificationGroupId, Protocol, ProtocolDocument, ProtocolTable, ProtocolTableError,
};
pub use status::AlertStatus;
