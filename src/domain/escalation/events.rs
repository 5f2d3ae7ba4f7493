//! Crisis alert domain events.
//!
//! - `CrisisAlertRaised` - alert created and active
//! - `CrisisAlertAcknowledged` - first acknowledgment received
//! - `CrisisAlertEscalated` - manual or timeout escalation
//! - `CrisisAlertClosed` - resolved or dismissed as a false positive
//! - `ProtocolMissing` - operational alert: no protocol configured

use serde::{Deserialize, Serialize};

use super::alert::Actor;
use super::protocol::{AlertType, NotificationGroupId};
use super::status::AlertStatus;
use crate::domain::assessment::{RiskFlag, Severity};
use crate::domain::foundation::{domain_event, AlertId, EventId, SessionId, Timestamp};

// ════════════════════════════════════════════════════════════════════════════
// CrisisAlertRaised
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAlertRaised {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub session_id: SessionId,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub flag: RiskFlag,
    /// True when the conservative default protocol was applied.
    pub protocol_defaulted: bool,
    pub notification_groups: Vec<NotificationGroupId>,
    pub raised_at: Timestamp,
}

domain_event!(
    CrisisAlertRaised,
    event_type = "crisis_alert.raised.v1",
    aggregate_id = alert_id,
    aggregate_type = "CrisisAlert",
    occurred_at = raised_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// CrisisAlertAcknowledged
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAlertAcknowledged {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub group: NotificationGroupId,
    pub actor: Actor,
    pub acknowledged_at: Timestamp,
}

domain_event!(
    CrisisAlertAcknowledged,
    event_type = "crisis_alert.acknowledged.v1",
    aggregate_id = alert_id,
    aggregate_type = "CrisisAlert",
    occurred_at = acknowledged_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// CrisisAlertEscalated
// ════════════════════════════════════════════════════════════════════════════

/// Published when an alert escalates, whether by timeout or by a clinician.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAlertEscalated {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub actor: Actor,
    /// True when the acknowledgment timer fired.
    pub automatic: bool,
    /// The protocol authorizes emergency services. Whether the call went
    /// through is recorded on the alert once delivery completes.
    pub emergency_services_requested: bool,
    pub escalated_at: Timestamp,
}

domain_event!(
    CrisisAlertEscalated,
    event_type = "crisis_alert.escalated.v1",
    aggregate_id = alert_id,
    aggregate_type = "CrisisAlert",
    occurred_at = escalated_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// CrisisAlertClosed
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAlertClosed {
    pub event_id: EventId,
    pub alert_id: AlertId,
    /// `resolved` or `false_positive`.
    pub outcome: AlertStatus,
    pub actor: Actor,
    pub closed_at: Timestamp,
}

domain_event!(
    CrisisAlertClosed,
    event_type = "crisis_alert.closed.v1",
    aggregate_id = alert_id,
    aggregate_type = "CrisisAlert",
    occurred_at = closed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ProtocolMissing
// ════════════════════════════════════════════════════════════════════════════

/// Operational alert: an alert was raised with no configured protocol.
///
/// Consumers should page whoever owns protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolMissing {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub protocol_version: u64,
    pub fallback_group: NotificationGroupId,
    pub detected_at: Timestamp,
}

domain_event!(
    ProtocolMissing,
    event_type = "protocol.missing.v1",
    aggregate_id = alert_id,
    aggregate_type = "CrisisAlert",
    occurred_at = detected_at,
    event_id = event_id
);
