//! NotificationGateway port - delivers crisis alerts to clinician groups.
//!
//! The gateway owns delivery retries and backoff. The escalation service
//! calls it from a spawned task, so an implementation may take as long as it
//! needs. A failure is recorded, never treated as handled, and never changes
//! alert state.
//! Acknowledgments come back later through `EscalationService::acknowledge`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::assessment::Severity;
use crate::domain::escalation::{AlertType, CrisisAlert, NotificationGroupId};
use crate::domain::foundation::{AlertId, ErrorCode, PatientRef, Timestamp};

/// Payload handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertNotification {
    pub alert_id: AlertId,
    pub patient_ref: PatientRef,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub triggered_at: Timestamp,
    pub recommended_actions: Vec<String>,
    pub notification_group_ids: Vec<NotificationGroupId>,
    pub emergency_services_authorized: bool,
    /// True when sent because the alert escalated.
    pub escalation: bool,
}

impl AlertNotification {
    /// Builds the payload from the alert's current snapshot.
    pub fn from_alert(alert: &CrisisAlert, escalation: bool) -> Self {
        let protocol = alert.protocol();
        Self {
            alert_id: alert.id(),
            patient_ref: alert.patient_ref().clone(),
            alert_type: alert.alert_type(),
            severity: alert.severity(),
            triggered_at: alert.raised_at(),
            recommended_actions: protocol.required_actions.clone(),
            notification_group_ids: protocol.notification_groups.clone(),
            emergency_services_authorized: protocol.emergency_services_authorized,
            escalation,
        }
    }
}

/// Per-group delivery confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub group: NotificationGroupId,
    pub delivered_at: Timestamp,
}

/// A group could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery to {group} failed: {reason}")]
pub struct DeliveryError {
    pub group: NotificationGroupId,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(group: NotificationGroupId, reason: impl Into<String>) -> Self {
        Self {
            group,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::DeliveryFailed
    }
}

/// Port for delivering crisis alerts.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Sends the notification to one group.
    async fn dispatch(
        &self,
        group: &NotificationGroupId,
        notification: &AlertNotification,
    ) -> Result<DispatchReceipt, DeliveryError>;

    /// Contacts emergency services for an authorized, escalated alert.
    async fn notify_emergency_services(
        &self,
        notification: &AlertNotification,
    ) -> Result<(), DeliveryError>;
}
