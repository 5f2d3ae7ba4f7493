//! EscalationService - owns crisis alerts from raise to closure.
//!
//! ## Concurrency
//!
//! Alerts live in a map behind an async `RwLock`; each alert sits behind its
//! own async `Mutex`. The acknowledgment timer is a tokio task that sleeps for
//! the protocol timeout, takes the alert lock and escalates only if the alert
//! is still `active`. Acknowledgment takes the same lock, transitions the
//! alert and aborts the timer, so exactly one of the two wins.
//!
//! Notification delivery runs on its own spawned task and records outcomes
//! on the alert when the gateway answers. A slow or hung gateway never blocks
//! the caller, and a failed delivery never changes status or the timer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::application::protocol::ProtocolRegistry;
use crate::domain::escalation::{
    Actor, AlertError, AlertRequest, AlertStatus, CrisisAlert, CrisisAlertAcknowledged,
    CrisisAlertClosed, CrisisAlertEscalated, CrisisAlertRaised, DeliveryState, EscalationError,
    NotificationGroupId, Protocol, ProtocolMissing,
};
use crate::domain::foundation::{AlertId, EventId, SerializableDomainEvent, SessionId, Timestamp};
use crate::ports::{AlertNotification, EventPublisher, NotificationGateway};

/// Configuration for the EscalationService.
#[derive(Debug, Clone)]
pub struct EscalationServiceConfig {
    /// Receives alerts raised under the conservative default protocol.
    pub fallback_group: NotificationGroupId,
}

impl Default for EscalationServiceConfig {
    fn default() -> Self {
        Self {
            fallback_group: NotificationGroupId::new("crisis-on-call"),
        }
    }
}

struct AlertSlot {
    alert: CrisisAlert,
    timer: Option<JoinHandle<()>>,
}

impl AlertSlot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Inner {
    registry: Arc<ProtocolRegistry>,
    gateway: Arc<dyn NotificationGateway>,
    event_publisher: Arc<dyn EventPublisher>,
    config: EscalationServiceConfig,
    alerts: RwLock<HashMap<AlertId, Arc<Mutex<AlertSlot>>>>,
    deliveries: Mutex<Vec<JoinHandle<()>>>,
}

/// Handle to the escalation service. Clones share the same alerts.
#[derive(Clone)]
pub struct EscalationService {
    inner: Arc<Inner>,
}

impl EscalationService {
    pub fn new(
        registry: Arc<ProtocolRegistry>,
        gateway: Arc<dyn NotificationGateway>,
        event_publisher: Arc<dyn EventPublisher>,
        config: EscalationServiceConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                gateway,
                event_publisher,
                config,
                alerts: RwLock::new(HashMap::new()),
                deliveries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates an active alert, starts its timer and notifies its groups.
    ///
    /// Falls back to the conservative default protocol when none is
    /// configured for the (alert type, severity) pair. Never fails: a crisis
    /// alert must always be raised. Returns before the groups are reached.
    pub async fn raise_alert(&self, request: AlertRequest) -> AlertId {
        let inner = &self.inner;
        let alert_id = AlertId::new();
        let now = Timestamp::now();
        let session_id = request.trigger.session_id;
        let flag = request.trigger.flag.clone();

        let table = inner.registry.snapshot();
        let (protocol, defaulted) = match table.lookup(request.alert_type, request.severity) {
            Some(protocol) => (protocol.clone(), false),
            None => {
                tracing::error!(
                    alert_id = %alert_id,
                    alert_type = %request.alert_type,
                    severity = %request.severity,
                    protocol_version = table.version(),
                    "no escalation protocol configured; applying conservative default"
                );
                inner
                    .publish(
                        ProtocolMissing {
                            event_id: EventId::new(),
                            alert_id,
                            alert_type: request.alert_type,
                            severity: request.severity,
                            protocol_version: table.version(),
                            fallback_group: inner.config.fallback_group.clone(),
                            detected_at: now,
                        },
                        session_id,
                        &Actor::System,
                    )
                    .await;
                (
                    Protocol::conservative_default(
                        request.alert_type,
                        request.severity,
                        inner.config.fallback_group.clone(),
                    ),
                    true,
                )
            }
        };

        let alert = CrisisAlert::raise(alert_id, request, protocol, defaulted, now);
        let notification = AlertNotification::from_alert(&alert, false);
        let timeout = alert.protocol().escalation_timeout();

        let raised = CrisisAlertRaised {
            event_id: EventId::new(),
            alert_id,
            session_id,
            alert_type: alert.alert_type(),
            severity: alert.severity(),
            flag,
            protocol_defaulted: defaulted,
            notification_groups: alert.protocol().notification_groups.clone(),
            raised_at: now,
        };

        let slot = Arc::new(Mutex::new(AlertSlot { alert, timer: None }));
        {
            // Hold the slot before it becomes visible so the timer cannot
            // observe an alert without its handle.
            let mut guard = slot.lock().await;
            inner.alerts.write().await.insert(alert_id, slot.clone());
            if let Some(timeout) = timeout {
                guard.timer = Some(Inner::spawn_timer(inner.clone(), alert_id, timeout));
            }
        }

        tracing::warn!(
            alert_id = %alert_id,
            session_id = %session_id,
            alert_type = %raised.alert_type,
            severity = %raised.severity,
            protocol_defaulted = defaulted,
            "crisis alert raised"
        );

        inner.publish(raised, session_id, &Actor::System).await;
        inner.spawn_delivery(slot, notification).await;
        alert_id
    }

    /// Records a group's acknowledgment.
    ///
    /// Returns true when this was the first acknowledgment, which moves the
    /// alert to `acknowledged` and cancels the escalation timer.
    pub async fn acknowledge(
        &self,
        alert_id: AlertId,
        group: &NotificationGroupId,
        actor: Actor,
        note: Option<String>,
    ) -> Result<bool, EscalationError> {
        let slot = self.inner.slot(alert_id).await?;
        let now = Timestamp::now();
        let mut guard = slot.lock().await;

        let first = guard.alert.acknowledge(group, actor.clone(), note, now)?;
        if !first {
            tracing::debug!(alert_id = %alert_id, group = %group, "acknowledgment recorded");
            return Ok(false);
        }
        guard.cancel_timer();
        let session_id = guard.alert.trigger().session_id;
        drop(guard);

        tracing::info!(alert_id = %alert_id, group = %group, actor = %actor, "crisis alert acknowledged");
        self.inner
            .publish(
                CrisisAlertAcknowledged {
                    event_id: EventId::new(),
                    alert_id,
                    group: group.clone(),
                    actor: actor.clone(),
                    acknowledged_at: now,
                },
                session_id,
                &actor,
            )
            .await;
        Ok(true)
    }

    /// Escalates an alert on a clinician's request.
    pub async fn escalate(
        &self,
        alert_id: AlertId,
        actor: Actor,
        note: Option<String>,
    ) -> Result<(), EscalationError> {
        self.inner.escalate(alert_id, actor, note, false).await
    }

    pub async fn resolve(
        &self,
        alert_id: AlertId,
        actor: Actor,
        note: Option<String>,
    ) -> Result<(), EscalationError> {
        self.inner
            .close(alert_id, actor, note, |alert, actor, note, at| {
                alert.resolve(actor, note, at)
            })
            .await
    }

    pub async fn mark_false_positive(
        &self,
        alert_id: AlertId,
        actor: Actor,
        note: Option<String>,
    ) -> Result<(), EscalationError> {
        self.inner
            .close(alert_id, actor, note, |alert, actor, note, at| {
                alert.mark_false_positive(actor, note, at)
            })
            .await
    }

    /// Snapshot of an alert.
    pub async fn alert(&self, alert_id: AlertId) -> Result<CrisisAlert, EscalationError> {
        let slot = self.inner.slot(alert_id).await?;
        let guard = slot.lock().await;
        Ok(guard.alert.clone())
    }

    /// Snapshots of every alert raised for a session.
    pub async fn alerts_for_session(&self, session_id: SessionId) -> Vec<CrisisAlert> {
        let slots: Vec<_> = self.inner.alerts.read().await.values().cloned().collect();
        let mut alerts = Vec::new();
        for slot in slots {
            let guard = slot.lock().await;
            if guard.alert.trigger().session_id == session_id {
                alerts.push(guard.alert.clone());
            }
        }
        alerts.sort_by_key(|a| a.raised_at());
        alerts
    }

    /// Waits until every in-flight delivery has recorded its outcome.
    ///
    /// Does not return while the gateway hangs.
    pub async fn flush_deliveries(&self) {
        loop {
            let pending = std::mem::take(&mut *self.inner.deliveries.lock().await);
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "delivery task ended abnormally");
                }
            }
        }
    }

    /// Aborts every pending timer and delivery. Alerts keep their current
    /// status.
    pub async fn shutdown(&self) {
        let slots: Vec<_> = self.inner.alerts.read().await.values().cloned().collect();
        for slot in slots {
            slot.lock().await.cancel_timer();
        }
        for handle in self.inner.deliveries.lock().await.drain(..) {
            handle.abort();
        }
    }
}

impl Inner {
    async fn slot(&self, alert_id: AlertId) -> Result<Arc<Mutex<AlertSlot>>, EscalationError> {
        self.alerts
            .read()
            .await
            .get(&alert_id)
            .cloned()
            .ok_or(EscalationError::NotFound(alert_id))
    }

    fn spawn_timer(
        inner: Arc<Inner>,
        alert_id: AlertId,
        timeout: std::time::Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            inner.escalate_on_timeout(alert_id).await;
        })
    }

    async fn escalate_on_timeout(self: &Arc<Self>, alert_id: AlertId) {
        let Ok(slot) = self.slot(alert_id).await else {
            return;
        };
        {
            let mut guard = slot.lock().await;
            // Dropping our own handle; aborting it would cancel this task.
            guard.timer = None;
            if guard.alert.status() != AlertStatus::Active {
                tracing::warn!(
                    alert_id = %alert_id,
                    status = %guard.alert.status(),
                    "escalation timer fired after the alert left active; not escalating"
                );
                return;
            }
        }
        if let Err(e) = self
            .escalate(
                alert_id,
                Actor::System,
                Some("acknowledgment timeout elapsed".to_string()),
                true,
            )
            .await
        {
            tracing::warn!(alert_id = %alert_id, error = %e, "timeout escalation skipped");
        }
    }

    async fn escalate(
        self: &Arc<Self>,
        alert_id: AlertId,
        actor: Actor,
        note: Option<String>,
        automatic: bool,
    ) -> Result<(), EscalationError> {
        let slot = self.slot(alert_id).await?;
        let now = Timestamp::now();

        let (notification, session_id) = {
            let mut guard = slot.lock().await;
            guard.alert.escalate(actor.clone(), note, now)?;
            if !automatic {
                guard.cancel_timer();
            }
            (
                AlertNotification::from_alert(&guard.alert, true),
                guard.alert.trigger().session_id,
            )
        };

        tracing::warn!(
            alert_id = %alert_id,
            actor = %actor,
            automatic,
            "crisis alert escalated"
        );

        let emergency_services_requested = notification.emergency_services_authorized;
        self.spawn_delivery(slot, notification).await;
        self.publish(
            CrisisAlertEscalated {
                event_id: EventId::new(),
                alert_id,
                actor: actor.clone(),
                automatic,
                emergency_services_requested,
                escalated_at: now,
            },
            session_id,
            &actor,
        )
        .await;
        Ok(())
    }

    async fn close<F>(
        &self,
        alert_id: AlertId,
        actor: Actor,
        note: Option<String>,
        apply: F,
    ) -> Result<(), EscalationError>
    where
        F: FnOnce(
            &mut CrisisAlert,
            Actor,
            Option<String>,
            Timestamp,
        ) -> Result<(), AlertError>,
    {
        let slot = self.slot(alert_id).await?;
        let now = Timestamp::now();

        let (outcome, session_id) = {
            let mut guard = slot.lock().await;
            apply(&mut guard.alert, actor.clone(), note, now)?;
            guard.cancel_timer();
            (guard.alert.status(), guard.alert.trigger().session_id)
        };

        tracing::info!(alert_id = %alert_id, outcome = %outcome, actor = %actor, "crisis alert closed");
        self.publish(
            CrisisAlertClosed {
                event_id: EventId::new(),
                alert_id,
                outcome,
                actor: actor.clone(),
                closed_at: now,
            },
            session_id,
            &actor,
        )
        .await;
        Ok(())
    }

    /// Hands the notification to a delivery task and tracks its handle.
    async fn spawn_delivery(
        self: &Arc<Self>,
        slot: Arc<Mutex<AlertSlot>>,
        notification: AlertNotification,
    ) {
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            inner.deliver(&slot, &notification).await;
        });

        let mut pending = self.deliveries.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Sends the notification to every group, then records the outcomes.
    async fn deliver(&self, slot: &Arc<Mutex<AlertSlot>>, notification: &AlertNotification) {
        let mut outcomes = Vec::with_capacity(notification.notification_group_ids.len());
        for group in &notification.notification_group_ids {
            let state = match self.gateway.dispatch(group, notification).await {
                Ok(receipt) => DeliveryState::Delivered {
                    at: receipt.delivered_at,
                },
                Err(e) => {
                    tracing::warn!(
                        alert_id = %notification.alert_id,
                        group = %group,
                        code = %e.code(),
                        error = %e,
                        "crisis alert delivery failed"
                    );
                    DeliveryState::Failed {
                        at: Timestamp::now(),
                        reason: e.reason,
                    }
                }
            };
            outcomes.push((group.clone(), state));
        }

        let emergency_notified =
            if notification.escalation && notification.emergency_services_authorized {
                match self.gateway.notify_emergency_services(notification).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(
                            alert_id = %notification.alert_id,
                            code = %e.code(),
                            error = %e,
                            "emergency services notification failed"
                        );
                        false
                    }
                }
            } else {
                false
            };

        let mut guard = slot.lock().await;
        for (group, state) in outcomes {
            if let Err(e) = guard.alert.record_delivery(&group, state) {
                tracing::warn!(alert_id = %notification.alert_id, error = %e, "delivery not recorded");
            }
        }
        if emergency_notified {
            guard.alert.mark_emergency_services_notified();
        }
    }

    /// Publishes an event correlated to its session. A publishing failure is
    /// logged, never propagated.
    async fn publish<E: SerializableDomainEvent>(
        &self,
        event: E,
        session_id: SessionId,
        actor: &Actor,
    ) {
        let event_type = event.event_type();
        let envelope = match event.to_envelope() {
            Ok(envelope) => envelope
                .with_correlation_id(session_id.to_string())
                .with_actor(actor.to_string()),
            Err(e) => {
                tracing::error!(event_type, error = %e, "failed to serialize event");
                return;
            }
        };
        if let Err(e) = self.event_publisher.publish(envelope).await {
            tracing::warn!(event_type, error = %e, "failed to publish event");
        }
    }
}
