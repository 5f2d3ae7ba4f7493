//! IntakeOrchestrator - drives a session through the staged intake.
//!
//! Loads the session, applies one command to the aggregate, raises a crisis
//! alert for every newly seen critical flag, and stores the result.
//!
//! Commands on the same session run one at a time behind a per-session lock,
//! so concurrent submissions cannot both see a flag as unalerted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::application::escalation::EscalationService;
use crate::domain::assessment::{AdaptiveAdjustment, Answer, AnswerSet};
use crate::domain::catalog::Stage;
use crate::domain::escalation::{AlertRequest, AlertTrigger};
use crate::domain::foundation::{AlertId, PatientRef, SessionId, Timestamp};
use crate::domain::intake::{
    AssessmentSession, FinalReport, IntakeError, IntakeStage, ReportBuilder, StageOutcome,
};
use crate::ports::SessionRepository;

/// Result of completing a stage.
#[derive(Debug, Clone)]
pub struct SubmitStageResult {
    pub outcome: StageOutcome,
    /// Where the session is now.
    pub next_stage: IntakeStage,
    /// Alerts raised by this submission.
    pub raised_alerts: Vec<AlertId>,
}

pub struct IntakeOrchestrator {
    repository: Arc<dyn SessionRepository>,
    escalation: EscalationService,
    session_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl IntakeOrchestrator {
    pub fn new(repository: Arc<dyn SessionRepository>, escalation: EscalationService) -> Self {
        Self {
            repository,
            escalation,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn start_intake(&self, patient_ref: PatientRef) -> Result<SessionId, IntakeError> {
        let session = AssessmentSession::start(SessionId::new(), patient_ref, Timestamp::now());
        self.repository.save(&session).await?;

        tracing::info!(session_id = %session.id(), "intake started");
        Ok(session.id())
    }

    /// Records one answer and returns any follow-ups it added.
    pub async fn record_answer(
        &self,
        session_id: SessionId,
        question_id: &str,
        answer: Answer,
    ) -> Result<Vec<AdaptiveAdjustment>, IntakeError> {
        let _guard = self.lock_session(session_id).await;
        let mut session = self.load(session_id).await?;

        let adjustment = session.record_answer(question_id, answer, Timestamp::now())?;
        self.repository.update(&session).await?;

        if let Some(adjustment) = &adjustment {
            tracing::debug!(
                session_id = %session_id,
                trigger = %adjustment.trigger,
                added = adjustment.added.len(),
                "follow-up questions added"
            );
        }
        Ok(adjustment.into_iter().collect())
    }

    /// Completes the active stage.
    ///
    /// Critical flags raise alerts before the session is stored, so a
    /// storage failure never swallows a crisis.
    pub async fn submit_stage(
        &self,
        session_id: SessionId,
        answers: &AnswerSet,
    ) -> Result<SubmitStageResult, IntakeError> {
        let _guard = self.lock_session(session_id).await;
        let mut session = self.load(session_id).await?;
        let stage = session
            .stage()
            .collecting()
            .ok_or_else(|| IntakeError::wrong_stage("submit answers", session.stage()))?;

        let outcome = match session.submit_stage(answers, Timestamp::now()) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::info!(session_id = %session_id, stage = %stage, error = %e, "stage submission rejected");
                return Err(e);
            }
        };

        let raised_alerts = self.raise_alerts(&mut session, stage).await;
        self.repository.update(&session).await?;

        match &outcome {
            StageOutcome::History => {
                tracing::info!(session_id = %session_id, stage = %stage, "stage completed");
            }
            StageOutcome::Short(result) => tracing::info!(
                session_id = %session_id,
                stage = %stage,
                total = result.total,
                severity = %result.severity,
                deep_screening = result.needs_deep_screening,
                flags = result.auto_flags.len(),
                "stage completed"
            ),
            StageOutcome::Deep(result) => tracing::info!(
                session_id = %session_id,
                stage = %stage,
                total = result.total,
                severity = %result.severity,
                flags = result.risk_flags.len(),
                "stage completed"
            ),
        }

        Ok(SubmitStageResult {
            outcome,
            next_stage: session.stage(),
            raised_alerts,
        })
    }

    /// Declines pending deep screening.
    pub async fn skip_deep_screening(&self, session_id: SessionId) -> Result<(), IntakeError> {
        let _guard = self.lock_session(session_id).await;
        let mut session = self.load(session_id).await?;
        session.skip_deep_screening(Timestamp::now())?;
        self.repository.update(&session).await?;

        tracing::info!(session_id = %session_id, "deep screening skipped");
        Ok(())
    }

    /// Builds the final report and closes the session.
    ///
    /// Unknown sessions and sessions not yet ready are caller errors. Any
    /// fault while building or storing degrades to the conservative
    /// crisis-level report instead of failing.
    pub async fn final_report(&self, session_id: SessionId) -> Result<FinalReport, IntakeError> {
        let _guard = self.lock_session(session_id).await;
        let mut session = self.load(session_id).await?;
        match session.stage() {
            IntakeStage::ReadyForReport => {}
            IntakeStage::Completed => return Err(IntakeError::Completed(session_id)),
            other => return Err(IntakeError::wrong_stage("generate the final report", other)),
        }

        let now = Timestamp::now();
        let report = match ReportBuilder::build(&session, now) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "report generation failed; returning conservative report");
                ReportBuilder::fallback(session_id, now)
            }
        };

        let stored = match session.complete(now) {
            Ok(()) => self.repository.update(&session).await.map_err(IntakeError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            tracing::error!(session_id = %session_id, error = %e, "failed to close session; returning conservative report");
            return Ok(ReportBuilder::fallback(session_id, now));
        }
        // Completed sessions reject every command; the lock is no longer needed.
        self.session_locks.lock().await.remove(&session_id);

        tracing::info!(
            session_id = %session_id,
            severity = %report.patient.severity,
            triage_level = %report.patient.triage_level,
            degraded = report.patient.degraded,
            "final report generated"
        );
        Ok(report)
    }

    pub async fn session(&self, session_id: SessionId) -> Result<AssessmentSession, IntakeError> {
        self.load(session_id).await
    }

    /// Serialises commands on one session.
    async fn lock_session(&self, session_id: SessionId) -> OwnedMutexGuard<()> {
        let lock = self
            .session_locks
            .lock()
            .await
            .entry(session_id)
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    async fn load(&self, session_id: SessionId) -> Result<AssessmentSession, IntakeError> {
        self.repository
            .find_by_id(&session_id)
            .await?
            .ok_or(IntakeError::NotFound(session_id))
    }

    async fn raise_alerts(&self, session: &mut AssessmentSession, stage: Stage) -> Vec<AlertId> {
        let mut raised = Vec::new();
        for flag in session.unalerted_critical_flags() {
            let Some(alert_type) = flag.alert_type() else {
                continue;
            };
            let request = AlertRequest {
                patient_ref: session.patient_ref().clone(),
                alert_type,
                severity: session.current_severity(),
                trigger: AlertTrigger {
                    session_id: session.id(),
                    stage,
                    flag: flag.clone(),
                },
            };
            let alert_id = self.escalation.raise_alert(request).await;
            session.record_alert(flag, alert_id);
            raised.push(alert_id);
        }
        raised
    }
}
