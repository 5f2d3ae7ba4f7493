//! Notification gateway that logs deliveries.
//!
//! Stands in for paging and messaging integrations when the engine runs
//! from the command line.

use async_trait::async_trait;

use crate::domain::escalation::NotificationGroupId;
use crate::domain::foundation::Timestamp;
use crate::ports::{AlertNotification, DeliveryError, DispatchReceipt, NotificationGateway};

#[derive(Debug, Clone, Default)]
pub struct TracingNotificationGateway;

impl TracingNotificationGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for TracingNotificationGateway {
    async fn dispatch(
        &self,
        group: &NotificationGroupId,
        notification: &AlertNotification,
    ) -> Result<DispatchReceipt, DeliveryError> {
        tracing::warn!(
            group = %group,
            alert_id = %notification.alert_id,
            alert_type = %notification.alert_type,
            severity = %notification.severity,
            escalation = notification.escalation,
            actions = ?notification.recommended_actions,
            "crisis alert dispatched"
        );
        Ok(DispatchReceipt {
            group: group.clone(),
            delivered_at: Timestamp::now(),
        })
    }

    async fn notify_emergency_services(
        &self,
        notification: &AlertNotification,
    ) -> Result<(), DeliveryError> {
        tracing::error!(
            alert_id = %notification.alert_id,
            patient_ref = %notification.patient_ref,
            "emergency services notified"
        );
        Ok(())
    }
}
