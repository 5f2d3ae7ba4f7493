//! End-to-end intake flow through the orchestrator.
//!
//! History -> Short -> (Deep) -> final report, with crisis alerts raised
//! through the escalation service and captured by in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use intake_triage::adapters::{
    InMemoryEventBus, InMemorySessionRepository, RecordingNotificationGateway,
};
use intake_triage::application::{
    EscalationService, EscalationServiceConfig, IntakeOrchestrator, ProtocolRegistry,
};
use intake_triage::domain::assessment::{Answer, AnswerSet, RiskFlag, Severity, TriageLevel};
use intake_triage::domain::catalog::{ids, QuestionCatalog, ResponseFormat, Stage};
use intake_triage::domain::escalation::{AlertStatus, AlertType, DeliveryState, NotificationGroupId};
use intake_triage::domain::foundation::{PatientRef, SessionId};
use intake_triage::domain::intake::{IntakeError, IntakeStage, StageOutcome};
use intake_triage::ports::{AlertNotification, DeliveryError, DispatchReceipt, NotificationGateway};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Flow {
    orchestrator: IntakeOrchestrator,
    escalation: EscalationService,
    gateway: Arc<RecordingNotificationGateway>,
    bus: Arc<InMemoryEventBus>,
}

fn flow() -> Flow {
    let gateway = Arc::new(RecordingNotificationGateway::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let escalation = EscalationService::new(
        Arc::new(ProtocolRegistry::empty()),
        gateway.clone(),
        bus.clone(),
        EscalationServiceConfig::default(),
    );
    let orchestrator = IntakeOrchestrator::new(
        Arc::new(InMemorySessionRepository::new()),
        escalation.clone(),
    );
    Flow {
        orchestrator,
        escalation,
        gateway,
        bus,
    }
}

/// Every core question of a stage answered with `value` (yes/no as value > 0).
fn answers(stage: Stage, value: u8) -> AnswerSet {
    let mut set = AnswerSet::new();
    for question in QuestionCatalog::global().core_questions(stage) {
        let answer = match question.format {
            ResponseFormat::YesNo => Answer::YesNo(value > 0),
            _ => Answer::Value(value.min(3)),
        };
        set.insert(question.id, answer);
    }
    set
}

/// Short screening with a suicide plan, which is a critical flag.
fn critical_short() -> AnswerSet {
    let mut short = answers(Stage::Short, 0);
    short.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(3));
    short.insert("q10a_suicide_plan", Answer::YesNo(true));
    short.insert("q10b_means_access", Answer::YesNo(false));
    short
}

async fn start_past_history(flow: &Flow) -> SessionId {
    past_history(&flow.orchestrator).await
}

async fn past_history(orchestrator: &IntakeOrchestrator) -> SessionId {
    let id = orchestrator
        .start_intake(PatientRef::new("patient-flow").unwrap())
        .await
        .unwrap();
    let result = orchestrator
        .submit_stage(id, &answers(Stage::History, 1))
        .await
        .unwrap();
    assert_eq!(result.next_stage, IntakeStage::Short);
    id
}

/// A gateway whose calls never complete.
struct StalledGateway;

#[async_trait]
impl NotificationGateway for StalledGateway {
    async fn dispatch(
        &self,
        _group: &NotificationGroupId,
        _notification: &AlertNotification,
    ) -> Result<DispatchReceipt, DeliveryError> {
        std::future::pending().await
    }

    async fn notify_emergency_services(
        &self,
        _notification: &AlertNotification,
    ) -> Result<(), DeliveryError> {
        std::future::pending().await
    }
}

// =============================================================================
// Flows
// =============================================================================

#[tokio::test]
async fn mild_intake_ends_at_monitor_without_deep_screening() {
    let flow = flow();
    let id = start_past_history(&flow).await;

    let result = flow
        .orchestrator
        .submit_stage(id, &answers(Stage::Short, 0))
        .await
        .unwrap();

    assert_eq!(result.next_stage, IntakeStage::ReadyForReport);
    let report = flow.orchestrator.final_report(id).await.unwrap();
    assert_eq!(report.patient.triage_level, TriageLevel::Monitor);
    assert_eq!(report.patient.booking_action, None);
    let clinician = report.clinician.unwrap();
    assert_eq!(clinician.scored_stage, Stage::Short);
    assert_eq!(clinician.demographics.len(), 7);
    assert_eq!(flow.gateway.dispatch_count().await, 0);
}

#[tokio::test]
async fn elevated_short_screening_continues_to_deep() {
    let flow = flow();
    let id = start_past_history(&flow).await;
    let mut short = answers(Stage::Short, 2);
    short.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(0));

    let result = flow.orchestrator.submit_stage(id, &short).await.unwrap();

    assert_eq!(result.next_stage, IntakeStage::Deep);
    let StageOutcome::Short(short_result) = result.outcome else {
        panic!("expected short outcome");
    };
    assert!(short_result.needs_deep_screening);

    let mut deep = answers(Stage::Deep, 1);
    deep.insert(ids::ACTIVE_SUICIDAL_THOUGHTS, Answer::Value(0));
    deep.insert("d7_passive_death_wish", Answer::Value(0));
    let result = flow.orchestrator.submit_stage(id, &deep).await.unwrap();
    assert_eq!(result.next_stage, IntakeStage::ReadyForReport);

    let report = flow.orchestrator.final_report(id).await.unwrap();
    let clinician = report.clinician.unwrap();
    assert_eq!(clinician.scored_stage, Stage::Deep);
    assert!(clinician.deep_total.is_some());
    assert!(report.patient.severity >= Severity::ModerateSevere);
}

#[tokio::test]
async fn submission_missing_triggered_follow_ups_is_rejected() {
    let flow = flow();
    let id = start_past_history(&flow).await;

    // q10 = 2 splices in follow-ups that were not answered.
    let err = flow
        .orchestrator
        .submit_stage(id, &answers(Stage::Short, 2))
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::Validation(_)));
    let session = flow.orchestrator.session(id).await.unwrap();
    assert_eq!(session.stage(), IntakeStage::Short);
    assert!(flow.escalation.alerts_for_session(id).await.is_empty());
}

#[tokio::test]
async fn critical_answer_raises_one_alert_with_default_protocol() {
    let flow = flow();
    let id = start_past_history(&flow).await;

    let result = flow
        .orchestrator
        .submit_stage(id, &critical_short())
        .await
        .unwrap();

    assert_eq!(result.raised_alerts.len(), 1);
    let alert = flow.escalation.alert(result.raised_alerts[0]).await.unwrap();
    assert_eq!(alert.alert_type(), AlertType::SuicideRisk);
    assert_eq!(alert.status(), AlertStatus::Active);
    assert!(alert.protocol_defaulted());
    assert!(flow.bus.has_event("protocol.missing.v1"));
    assert!(flow.bus.has_event("crisis_alert.raised.v1"));

    // Skipping deep screening keeps the crisis triage.
    assert_eq!(result.next_stage, IntakeStage::Deep);
    flow.orchestrator.skip_deep_screening(id).await.unwrap();
    let report = flow.orchestrator.final_report(id).await.unwrap();
    assert_eq!(report.patient.triage_level, TriageLevel::PsychiatristCrisis);
    assert!(report.patient.deep_screening_skipped);
    assert!(report
        .patient
        .urgent_flags
        .iter()
        .any(|f| f == RiskFlag::CRITICAL_SUICIDALITY_RISK));
    assert_eq!(
        report.clinician.unwrap().crisis_alerts,
        result.raised_alerts
    );
}

#[tokio::test]
async fn same_critical_flag_in_deep_stage_is_not_alerted_twice() {
    let flow = flow();
    let id = start_past_history(&flow).await;

    let mut short = answers(Stage::Short, 0);
    short.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(2));
    short.insert("q10a_suicide_plan", Answer::YesNo(false));
    short.insert("q10b_means_access", Answer::YesNo(false));
    let first = flow.orchestrator.submit_stage(id, &short).await.unwrap();
    assert_eq!(first.raised_alerts.len(), 1);

    let mut deep = answers(Stage::Deep, 0);
    deep.insert(ids::ACTIVE_SUICIDAL_THOUGHTS, Answer::Value(3));
    deep.insert("d8a_suicide_plan", Answer::YesNo(true));
    deep.insert("d8b_prior_attempt", Answer::YesNo(false));
    let second = flow.orchestrator.submit_stage(id, &deep).await.unwrap();

    assert!(second.raised_alerts.is_empty());
    assert_eq!(
        flow.escalation.alerts_for_session(id).await.len(),
        1
    );
}

#[tokio::test]
async fn psychosis_crisis_in_deep_stage_raises_psychosis_alert() {
    let flow = flow();
    let id = start_past_history(&flow).await;
    let mut short = answers(Stage::Short, 1);
    short.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(0));
    flow.orchestrator.submit_stage(id, &short).await.unwrap();

    let mut deep = answers(Stage::Deep, 0);
    deep.insert(ids::HALLUCINATIONS, Answer::Value(3));
    deep.insert("d11a_command_hallucinations", Answer::YesNo(true));
    let result = flow.orchestrator.submit_stage(id, &deep).await.unwrap();

    assert_eq!(result.raised_alerts.len(), 1);
    let alert = flow.escalation.alert(result.raised_alerts[0]).await.unwrap();
    assert_eq!(alert.alert_type(), AlertType::PsychosisCrisis);
    assert_eq!(alert.trigger().stage, Stage::Deep);
}

#[tokio::test]
async fn incremental_answers_grow_the_sequence() {
    let flow = flow();
    let id = start_past_history(&flow).await;

    let added = flow
        .orchestrator
        .record_answer(id, ids::SUICIDAL_THOUGHTS, Answer::Value(1))
        .await
        .unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].added.len(), 2);

    // Re-answering does not splice the follow-ups twice.
    let again = flow
        .orchestrator
        .record_answer(id, ids::SUICIDAL_THOUGHTS, Answer::Value(2))
        .await
        .unwrap();
    assert!(again.is_empty());

    let err = flow
        .orchestrator
        .record_answer(id, "d1_depressed_mood", Answer::Value(1))
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::Validation(_)));
}

#[tokio::test]
async fn out_of_range_value_is_rejected_with_question_id() {
    let flow = flow();
    let id = start_past_history(&flow).await;
    let mut short = answers(Stage::Short, 0);
    short.insert("q1_low_mood", Answer::Value(9));

    let err = flow.orchestrator.submit_stage(id, &short).await.unwrap_err();

    let IntakeError::Validation(incomplete) = err else {
        panic!("expected validation error");
    };
    assert!(incomplete
        .offending_ids()
        .iter()
        .any(|id| id.as_str() == "q1_low_mood"));
}

#[tokio::test]
async fn concurrent_submissions_raise_one_alert() {
    let flow = flow();
    let id = start_past_history(&flow).await;
    let short = critical_short();

    let (first, second) = tokio::join!(
        flow.orchestrator.submit_stage(id, &short),
        flow.orchestrator.submit_stage(id, &short),
    );

    // The loser sees the session already in deep screening.
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );
    assert_eq!(flow.escalation.alerts_for_session(id).await.len(), 1);
    assert_eq!(flow.bus.events_of_type("crisis_alert.raised.v1").len(), 1);
    let session = flow.orchestrator.session(id).await.unwrap();
    assert_eq!(session.stage(), IntakeStage::Deep);
}

#[tokio::test]
async fn stalled_gateway_does_not_block_submission() {
    let escalation = EscalationService::new(
        Arc::new(ProtocolRegistry::empty()),
        Arc::new(StalledGateway),
        Arc::new(InMemoryEventBus::new()),
        EscalationServiceConfig::default(),
    );
    let orchestrator = IntakeOrchestrator::new(
        Arc::new(InMemorySessionRepository::new()),
        escalation.clone(),
    );
    let id = past_history(&orchestrator).await;

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.submit_stage(id, &critical_short()),
    )
    .await
    .expect("submission waited on notification delivery")
    .unwrap();

    assert_eq!(result.raised_alerts.len(), 1);
    let alert = escalation.alert(result.raised_alerts[0]).await.unwrap();
    assert_eq!(alert.status(), AlertStatus::Active);
    assert!(alert
        .targets()
        .iter()
        .all(|t| t.delivery == DeliveryState::Pending));

    // Later commands on the session are not held up either.
    tokio::time::timeout(Duration::from_secs(5), orchestrator.skip_deep_screening(id))
        .await
        .expect("skip waited on notification delivery")
        .unwrap();
    escalation.shutdown().await;
}
