//! Recording notification gateway.
//!
//! Keeps every dispatch in memory. Groups can be marked unreachable to
//! exercise the delivery-failure path.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::escalation::NotificationGroupId;
use crate::domain::foundation::{AlertId, Timestamp};
use crate::ports::{AlertNotification, DeliveryError, DispatchReceipt, NotificationGateway};

/// One recorded dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDispatch {
    pub group: NotificationGroupId,
    pub notification: AlertNotification,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationGateway {
    dispatches: Arc<RwLock<Vec<RecordedDispatch>>>,
    emergency_calls: Arc<RwLock<Vec<AlertNotification>>>,
    unreachable: Arc<RwLock<HashSet<NotificationGroupId>>>,
}

impl RecordingNotificationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every dispatch to `group` fail.
    pub async fn fail_group(&self, group: impl Into<NotificationGroupId>) {
        self.unreachable.write().await.insert(group.into());
    }

    pub async fn dispatches(&self) -> Vec<RecordedDispatch> {
        self.dispatches.read().await.clone()
    }

    /// Dispatches made for one alert, in order.
    pub async fn dispatches_for(&self, alert_id: AlertId) -> Vec<RecordedDispatch> {
        self.dispatches
            .read()
            .await
            .iter()
            .filter(|d| d.notification.alert_id == alert_id)
            .cloned()
            .collect()
    }

    pub async fn dispatch_count(&self) -> usize {
        self.dispatches.read().await.len()
    }

    pub async fn emergency_calls(&self) -> Vec<AlertNotification> {
        self.emergency_calls.read().await.clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotificationGateway {
    async fn dispatch(
        &self,
        group: &NotificationGroupId,
        notification: &AlertNotification,
    ) -> Result<DispatchReceipt, DeliveryError> {
        if self.unreachable.read().await.contains(group) {
            return Err(DeliveryError::new(group.clone(), "group unreachable"));
        }

        self.dispatches.write().await.push(RecordedDispatch {
            group: group.clone(),
            notification: notification.clone(),
        });

        Ok(DispatchReceipt {
            group: group.clone(),
            delivered_at: Timestamp::now(),
        })
    }

    async fn notify_emergency_services(
        &self,
        notification: &AlertNotification,
    ) -> Result<(), DeliveryError> {
        self.emergency_calls.write().await.push(notification.clone());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assessment::Severity;
    use crate::domain::escalation::AlertType;
    use crate::domain::foundation::PatientRef;

    fn notification() -> AlertNotification {
        AlertNotification {
            alert_id: AlertId::new(),
            patient_ref: PatientRef::new("patient-7").unwrap(),
            alert_type: AlertType::SuicideRisk,
            severity: Severity::Severe,
            triggered_at: Timestamp::now(),
            recommended_actions: vec!["Call patient".to_string()],
            notification_group_ids: vec!["crisis-team".into()],
            emergency_services_authorized: false,
            escalation: false,
        }
    }

    #[tokio::test]
    async fn dispatch_is_recorded() {
        let gateway = RecordingNotificationGateway::new();
        let n = notification();

        let receipt = gateway.dispatch(&"crisis-team".into(), &n).await.unwrap();

        assert_eq!(receipt.group.as_str(), "crisis-team");
        assert_eq!(gateway.dispatch_count().await, 1);
        assert_eq!(gateway.dispatches_for(n.alert_id).await.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_group_fails_and_is_not_recorded() {
        let gateway = RecordingNotificationGateway::new();
        gateway.fail_group("on-call").await;

        let err = gateway
            .dispatch(&"on-call".into(), &notification())
            .await
            .unwrap_err();

        assert_eq!(err.group.as_str(), "on-call");
        assert_eq!(gateway.dispatch_count().await, 0);
    }

    #[tokio::test]
    async fn emergency_calls_are_recorded() {
        let gateway = RecordingNotificationGateway::new();
        gateway
            .notify_emergency_services(&notification())
            .await
            .unwrap();
        assert_eq!(gateway.emergency_calls().await.len(), 1);
    }
}
