//! CrisisAlert aggregate.
//!
//! Created only for a critical risk flag. Carries its own copy of the
//! protocol that was in force when it was raised, so later protocol reloads
//! never change the handling of an alert already in flight.
//!
//! # Invariants
//!
//! - `status` only moves along [`AlertStatus`] transitions
//! - `history` is append-only; every transition adds exactly one entry
//! - with `human_in_loop`, only a clinician can resolve or dismiss

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::AlertError;
use super::protocol::{AlertType, NotificationGroupId, Protocol};
use super::status::AlertStatus;
use crate::domain::assessment::{RiskFlag, Severity};
use crate::domain::catalog::Stage;
use crate::domain::foundation::{AlertId, PatientRef, SessionId, StateMachine, Timestamp};

/// Who performed an alert action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    System,
    Clinician { id: String },
}

impl Actor {
    pub fn clinician(id: impl Into<String>) -> Self {
        Actor::Clinician { id: id.into() }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Actor::Clinician { .. })
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::System => write!(f, "system"),
            Actor::Clinician { id } => write!(f, "clinician:{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    Raised,
    Acknowledged,
    Escalated,
    Resolved,
    MarkedFalsePositive,
}

/// One immutable audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertHistoryEntry {
    pub at: Timestamp,
    pub action: AlertAction,
    pub actor: Actor,
    pub from: AlertStatus,
    pub to: AlertStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Delivery outcome for a notification group, as last reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeliveryState {
    Pending,
    Delivered { at: Timestamp },
    Failed { at: Timestamp, reason: String },
}

/// A notification group bound to the alert and its acknowledgment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTarget {
    pub group: NotificationGroupId,
    pub delivery: DeliveryState,
    pub acknowledged_at: Option<Timestamp>,
    pub acknowledged_by: Option<Actor>,
}

impl NotificationTarget {
    fn pending(group: NotificationGroupId) -> Self {
        Self {
            group,
            delivery: DeliveryState::Pending,
            acknowledged_at: None,
            acknowledged_by: None,
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
    }
}

/// What raised the alert: the session, stage and critical flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTrigger {
    pub session_id: SessionId,
    pub stage: Stage,
    pub flag: RiskFlag,
}

/// Request to raise a crisis alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub patient_ref: PatientRef,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub trigger: AlertTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisAlert {
    id: AlertId,
    patient_ref: PatientRef,
    alert_type: AlertType,
    severity: Severity,
    trigger: AlertTrigger,
    status: AlertStatus,
    protocol: Protocol,
    /// True when no protocol was configured and the conservative default applied.
    protocol_defaulted: bool,
    targets: Vec<NotificationTarget>,
    emergency_services_notified: bool,
    raised_at: Timestamp,
    history: Vec<AlertHistoryEntry>,
}

impl CrisisAlert {
    /// Creates the alert and moves it straight from `none` to `active`.
    pub fn raise(
        id: AlertId,
        request: AlertRequest,
        protocol: Protocol,
        protocol_defaulted: bool,
        at: Timestamp,
    ) -> Self {
        let targets = protocol
            .notification_groups
            .iter()
            .cloned()
            .map(NotificationTarget::pending)
            .collect();

        let mut alert = Self {
            id,
            patient_ref: request.patient_ref,
            alert_type: request.alert_type,
            severity: request.severity,
            trigger: request.trigger,
            status: AlertStatus::None,
            protocol,
            protocol_defaulted,
            targets,
            emergency_services_notified: false,
            raised_at: at,
            history: Vec::new(),
        };
        alert.status = AlertStatus::Active;
        alert.history.push(AlertHistoryEntry {
            at,
            action: AlertAction::Raised,
            actor: Actor::System,
            from: AlertStatus::None,
            to: AlertStatus::Active,
            note: Some(format!("{} raised by {}", alert.alert_type, alert.trigger.flag)),
        });
        alert
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn patient_ref(&self) -> &PatientRef {
        &self.patient_ref
    }

    pub fn alert_type(&self) -> AlertType {
        self.alert_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn trigger(&self) -> &AlertTrigger {
        &self.trigger
    }

    pub fn status(&self) -> AlertStatus {
        self.status
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn protocol_defaulted(&self) -> bool {
        self.protocol_defaulted
    }

    pub fn targets(&self) -> &[NotificationTarget] {
        &self.targets
    }

    pub fn emergency_services_notified(&self) -> bool {
        self.emergency_services_notified
    }

    pub fn raised_at(&self) -> Timestamp {
        self.raised_at
    }

    pub fn history(&self) -> &[AlertHistoryEntry] {
        &self.history
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Records a group's acknowledgment.
    ///
    /// The first acknowledgment moves `active` to `acknowledged` and returns
    /// true. Later ones are recorded on the target and in history only.
    pub fn acknowledge(
        &mut self,
        group: &NotificationGroupId,
        actor: Actor,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<bool, AlertError> {
        if self.status.is_closed() || self.status == AlertStatus::None {
            return Err(AlertError::InvalidTransition {
                from: self.status,
                to: AlertStatus::Acknowledged,
            });
        }
        let target = self
            .targets
            .iter_mut()
            .find(|t| &t.group == group)
            .ok_or_else(|| AlertError::UnknownGroup(group.clone()))?;
        if target.acknowledged_at.is_none() {
            target.acknowledged_at = Some(at);
            target.acknowledged_by = Some(actor.clone());
        }

        if self.status == AlertStatus::Active {
            self.transition(AlertStatus::Acknowledged, AlertAction::Acknowledged, actor, note, at)?;
            return Ok(true);
        }

        self.history.push(AlertHistoryEntry {
            at,
            action: AlertAction::Acknowledged,
            actor,
            from: self.status,
            to: self.status,
            note,
        });
        Ok(false)
    }

    /// Moves the alert to `escalated`.
    ///
    /// The system may only escalate an alert that is still `active`.
    pub fn escalate(
        &mut self,
        actor: Actor,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<(), AlertError> {
        if !actor.is_human() && self.status != AlertStatus::Active {
            return Err(AlertError::InvalidTransition {
                from: self.status,
                to: AlertStatus::Escalated,
            });
        }
        self.transition(AlertStatus::Escalated, AlertAction::Escalated, actor, note, at)
    }

    pub fn resolve(
        &mut self,
        actor: Actor,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<(), AlertError> {
        self.require_human(&actor, "resolve")?;
        self.transition(AlertStatus::Resolved, AlertAction::Resolved, actor, note, at)
    }

    pub fn mark_false_positive(
        &mut self,
        actor: Actor,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<(), AlertError> {
        self.require_human(&actor, "mark_false_positive")?;
        self.transition(
            AlertStatus::FalsePositive,
            AlertAction::MarkedFalsePositive,
            actor,
            note,
            at,
        )
    }

    /// Records the latest delivery outcome for a group. Status is untouched.
    pub fn record_delivery(
        &mut self,
        group: &NotificationGroupId,
        delivery: DeliveryState,
    ) -> Result<(), AlertError> {
        let target = self
            .targets
            .iter_mut()
            .find(|t| &t.group == group)
            .ok_or_else(|| AlertError::UnknownGroup(group.clone()))?;
        target.delivery = delivery;
        Ok(())
    }

    pub fn mark_emergency_services_notified(&mut self) {
        self.emergency_services_notified = true;
    }

    fn require_human(&self, actor: &Actor, action: &'static str) -> Result<(), AlertError> {
        if self.protocol.human_in_loop && !actor.is_human() {
            return Err(AlertError::HumanActionRequired { action });
        }
        Ok(())
    }

    fn transition(
        &mut self,
        to: AlertStatus,
        action: AlertAction,
        actor: Actor,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<(), AlertError> {
        let from = self.status;
        self.status = from
            .transition_to(to)
            .map_err(|_| AlertError::InvalidTransition { from, to })?;
        self.history.push(AlertHistoryEntry {
            at,
            action,
            actor,
            from,
            to,
            note,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(human_in_loop: bool) -> Protocol {
        Protocol {
            alert_type: AlertType::SuicideRisk,
            severity: Severity::Severe,
            auto_escalation_enabled: true,
            escalation_timeout_minutes: 5,
            required_actions: vec!["Call patient".to_string()],
            notification_groups: vec!["crisis-team".into(), "psychiatry".into()],
            emergency_services_authorized: true,
            human_in_loop,
        }
    }

    fn alert(human_in_loop: bool) -> CrisisAlert {
        let request = AlertRequest {
            patient_ref: PatientRef::new("patient-7").unwrap(),
            alert_type: AlertType::SuicideRisk,
            severity: Severity::Severe,
            trigger: AlertTrigger {
                session_id: SessionId::new(),
                stage: Stage::Short,
                flag: RiskFlag::from_static(RiskFlag::CRITICAL_SUICIDALITY_RISK),
            },
        };
        CrisisAlert::raise(
            AlertId::new(),
            request,
            protocol(human_in_loop),
            false,
            Timestamp::now(),
        )
    }

    fn nurse() -> Actor {
        Actor::clinician("nurse-1")
    }

    #[test]
    fn raise_activates_with_one_history_entry() {
        let alert = alert(true);

        assert_eq!(alert.status(), AlertStatus::Active);
        assert_eq!(alert.history().len(), 1);
        assert_eq!(alert.history()[0].from, AlertStatus::None);
        assert_eq!(alert.history()[0].to, AlertStatus::Active);
        assert_eq!(alert.targets().len(), 2);
        assert!(alert
            .targets()
            .iter()
            .all(|t| t.delivery == DeliveryState::Pending));
    }

    #[test]
    fn first_acknowledgment_transitions_later_ones_record() {
        let mut alert = alert(true);
        let now = Timestamp::now();

        let first = alert
            .acknowledge(&"crisis-team".into(), nurse(), None, now)
            .unwrap();
        let second = alert
            .acknowledge(&"psychiatry".into(), Actor::clinician("dr-2"), None, now)
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(alert.status(), AlertStatus::Acknowledged);
        assert!(alert.targets().iter().all(|t| t.is_acknowledged()));
        assert_eq!(alert.history().len(), 3);
    }

    #[test]
    fn acknowledgment_from_unknown_group_is_rejected() {
        let mut alert = alert(true);
        let result = alert.acknowledge(&"billing".into(), nurse(), None, Timestamp::now());

        assert_eq!(result, Err(AlertError::UnknownGroup("billing".into())));
        assert_eq!(alert.status(), AlertStatus::Active);
    }

    #[test]
    fn system_cannot_resolve_with_human_in_loop() {
        let mut alert = alert(true);
        alert
            .acknowledge(&"crisis-team".into(), nurse(), None, Timestamp::now())
            .unwrap();

        let result = alert.resolve(Actor::System, None, Timestamp::now());
        assert!(matches!(result, Err(AlertError::HumanActionRequired { .. })));

        let result = alert.mark_false_positive(Actor::System, None, Timestamp::now());
        assert!(matches!(result, Err(AlertError::HumanActionRequired { .. })));
        assert_eq!(alert.status(), AlertStatus::Acknowledged);
    }

    #[test]
    fn clinician_can_resolve_after_escalation() {
        let mut alert = alert(true);
        alert.escalate(Actor::System, None, Timestamp::now()).unwrap();
        alert
            .resolve(nurse(), Some("patient safe".to_string()), Timestamp::now())
            .unwrap();

        assert_eq!(alert.status(), AlertStatus::Resolved);
        let actions: Vec<_> = alert.history().iter().map(|h| h.action).collect();
        assert_eq!(
            actions,
            vec![AlertAction::Raised, AlertAction::Escalated, AlertAction::Resolved]
        );
    }

    #[test]
    fn system_escalation_only_from_active() {
        let mut alert = alert(true);
        alert
            .acknowledge(&"crisis-team".into(), nurse(), None, Timestamp::now())
            .unwrap();

        assert!(alert.escalate(Actor::System, None, Timestamp::now()).is_err());
        assert!(alert.escalate(nurse(), None, Timestamp::now()).is_ok());
    }

    #[test]
    fn false_positive_requires_acknowledgment() {
        let mut alert = alert(false);
        let result = alert.mark_false_positive(nurse(), None, Timestamp::now());

        assert_eq!(
            result,
            Err(AlertError::InvalidTransition {
                from: AlertStatus::Active,
                to: AlertStatus::FalsePositive
            })
        );
    }

    #[test]
    fn closed_alert_rejects_acknowledgment() {
        let mut alert = alert(true);
        alert
            .acknowledge(&"crisis-team".into(), nurse(), None, Timestamp::now())
            .unwrap();
        alert.resolve(nurse(), None, Timestamp::now()).unwrap();

        assert!(alert
            .acknowledge(&"psychiatry".into(), nurse(), None, Timestamp::now())
            .is_err());
    }

    #[test]
    fn failed_delivery_leaves_status_active() {
        let mut alert = alert(true);
        alert
            .record_delivery(
                &"crisis-team".into(),
                DeliveryState::Failed {
                    at: Timestamp::now(),
                    reason: "pager offline".to_string(),
                },
            )
            .unwrap();

        assert_eq!(alert.status(), AlertStatus::Active);
        assert!(matches!(alert.targets()[0].delivery, DeliveryState::Failed { .. }));
    }
}
