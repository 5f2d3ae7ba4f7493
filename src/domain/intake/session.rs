//! AssessmentSession aggregate root.
//!
//! Owns one history answer set, one short-questionnaire answer set and, only
//! when triggered, one deep-screening answer set, together with the derived
//! results and the crisis alerts raised for this session.
//!
//! # Invariants
//!
//! - stages advance only along [`IntakeStage`] transitions
//! - a stage's answers are frozen once the stage completes
//! - scoring only ever runs on a validated answer set
//! - each critical flag raises at most one crisis alert per session

use serde::{Deserialize, Serialize};

use super::errors::IntakeError;
use super::stage::IntakeStage;
use crate::domain::assessment::{
    AdaptiveAdjustment, Answer, AnswerSet, DeepScreeningResult, IncompleteAnswerSet,
    QuestionSequence, RiskFlag, Scorer, Severity, ShortScreeningResult,
};
use crate::domain::catalog::{QuestionCatalog, Stage};
use crate::domain::foundation::{AlertId, PatientRef, QuestionId, SessionId, StateMachine, Timestamp};

/// Answers and adaptive sequence of one questionnaire stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    answers: AnswerSet,
    sequence: QuestionSequence,
    completed_at: Option<Timestamp>,
}

impl StageProgress {
    fn new(stage: Stage) -> Self {
        Self {
            answers: AnswerSet::new(),
            sequence: QuestionSequence::for_stage(stage),
            completed_at: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.sequence.stage()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn sequence(&self) -> &QuestionSequence {
        &self.sequence
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Ids still to be answered, follow-ups included.
    pub fn remaining(&self) -> Vec<QuestionId> {
        self.sequence.unanswered(&self.answers)
    }
}

/// Result of completing a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageOutcome {
    History,
    Short(ShortScreeningResult),
    Deep(DeepScreeningResult),
}

/// A crisis alert raised for one critical flag of this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaisedAlert {
    pub flag: RiskFlag,
    pub alert_id: AlertId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSession {
    id: SessionId,
    patient_ref: PatientRef,
    stage: IntakeStage,
    history: StageProgress,
    short: StageProgress,
    deep: Option<StageProgress>,
    short_result: Option<ShortScreeningResult>,
    deep_result: Option<DeepScreeningResult>,
    deep_skipped: bool,
    alerts: Vec<RaisedAlert>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl AssessmentSession {
    /// Starts intake at the history stage.
    pub fn start(id: SessionId, patient_ref: PatientRef, at: Timestamp) -> Self {
        Self {
            id,
            patient_ref,
            stage: IntakeStage::History,
            history: StageProgress::new(Stage::History),
            short: StageProgress::new(Stage::Short),
            deep: None,
            short_result: None,
            deep_result: None,
            deep_skipped: false,
            alerts: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn patient_ref(&self) -> &PatientRef {
        &self.patient_ref
    }

    pub fn stage(&self) -> IntakeStage {
        self.stage
    }

    pub fn history(&self) -> &StageProgress {
        &self.history
    }

    pub fn short(&self) -> &StageProgress {
        &self.short
    }

    pub fn deep(&self) -> Option<&StageProgress> {
        self.deep.as_ref()
    }

    pub fn short_result(&self) -> Option<&ShortScreeningResult> {
        self.short_result.as_ref()
    }

    pub fn deep_result(&self) -> Option<&DeepScreeningResult> {
        self.deep_result.as_ref()
    }

    pub fn deep_skipped(&self) -> bool {
        self.deep_skipped
    }

    pub fn alerts(&self) -> &[RaisedAlert] {
        &self.alerts
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_completed(&self) -> bool {
        self.stage == IntakeStage::Completed
    }

    /// Progress of the stage currently collecting answers.
    pub fn active_progress(&self) -> Option<&StageProgress> {
        match self.stage.collecting()? {
            Stage::History => Some(&self.history),
            Stage::Short => Some(&self.short),
            Stage::Deep => self.deep.as_ref(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived results
    // ─────────────────────────────────────────────────────────────────────────

    /// The more severe of the short and deep bands.
    pub fn final_severity(&self) -> Option<Severity> {
        let short = self.short_result.as_ref()?.severity;
        Some(match &self.deep_result {
            Some(deep) => short.max(deep.severity),
            None => short,
        })
    }

    /// Ordered union of short and deep flags.
    pub fn final_flags(&self) -> Vec<RiskFlag> {
        let mut flags: Vec<RiskFlag> = Vec::new();
        let short = self.short_result.iter().flat_map(|r| r.auto_flags.iter());
        let deep = self.deep_result.iter().flat_map(|r| r.risk_flags.iter());
        for flag in short.chain(deep) {
            if !flags.contains(flag) {
                flags.push(flag.clone());
            }
        }
        flags
    }

    /// Critical flags with no alert raised yet, in flag order.
    pub fn unalerted_critical_flags(&self) -> Vec<RiskFlag> {
        self.final_flags()
            .into_iter()
            .filter(|f| f.is_critical())
            .filter(|f| !self.alerts.iter().any(|a| &a.flag == f))
            .collect()
    }

    /// Severity used for an alert raised now: the latest completed band.
    pub fn current_severity(&self) -> Severity {
        self.final_severity().unwrap_or(Severity::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Records one answer for the active stage and applies adaptive growth.
    ///
    /// The question must be in the stage's current sequence and the value
    /// permissible. Re-answering overwrites the earlier value.
    pub fn record_answer(
        &mut self,
        question_id: &str,
        answer: Answer,
        at: Timestamp,
    ) -> Result<Option<AdaptiveAdjustment>, IntakeError> {
        let stage = self.collecting_stage("record an answer")?;
        let progress = self.progress_mut(stage)?;

        let permitted = progress.sequence.contains(question_id)
            && QuestionCatalog::global()
                .question(question_id)
                .is_some_and(|q| q.accepts(&answer));
        if !permitted {
            return Err(IncompleteAnswerSet {
                stage,
                missing: Vec::new(),
                invalid: vec![QuestionId::from(question_id)],
            }
            .into());
        }

        progress.answers.insert(question_id, answer);
        let adjustment = progress.sequence.apply(question_id, &answer);
        self.updated_at = at;
        Ok(adjustment)
    }

    /// Completes the active stage with the given answers.
    ///
    /// Answers are merged over any recorded ones and adaptive growth is
    /// applied before validation. On failure nothing is committed.
    pub fn submit_stage(
        &mut self,
        answers: &AnswerSet,
        at: Timestamp,
    ) -> Result<StageOutcome, IntakeError> {
        let stage = self.collecting_stage("submit answers")?;
        let current = self.progress_mut(stage)?;

        let mut candidate = current.clone();
        candidate.answers.merge(answers);
        let recorded = candidate.answers.clone();
        candidate.sequence.apply_all(&recorded);
        candidate
            .answers
            .validate(stage, candidate.sequence.ids(), QuestionCatalog::global())?;
        candidate.completed_at = Some(at);
        *current = candidate;

        let outcome = match stage {
            Stage::History => {
                self.advance(IntakeStage::Short)?;
                StageOutcome::History
            }
            Stage::Short => {
                let result = Scorer::score_short(&self.short.answers);
                if result.needs_deep_screening {
                    self.deep = Some(StageProgress::new(Stage::Deep));
                    self.advance(IntakeStage::Deep)?;
                } else {
                    self.advance(IntakeStage::ReadyForReport)?;
                }
                self.short_result = Some(result.clone());
                StageOutcome::Short(result)
            }
            Stage::Deep => {
                let answers = self
                    .deep
                    .as_ref()
                    .map(|d| d.answers.clone())
                    .unwrap_or_default();
                let result = Scorer::score_deep(&answers);
                self.deep_result = Some(result.clone());
                self.advance(IntakeStage::ReadyForReport)?;
                StageOutcome::Deep(result)
            }
        };
        self.updated_at = at;
        Ok(outcome)
    }

    /// Declines pending deep screening. Short-stage flags and triage stand.
    pub fn skip_deep_screening(&mut self, at: Timestamp) -> Result<(), IntakeError> {
        if self.stage != IntakeStage::Deep {
            return Err(IntakeError::wrong_stage("skip deep screening", self.stage));
        }
        self.deep_skipped = true;
        self.advance(IntakeStage::ReadyForReport)?;
        self.updated_at = at;
        Ok(())
    }

    /// Notes that an alert was raised for a critical flag.
    pub fn record_alert(&mut self, flag: RiskFlag, alert_id: AlertId) {
        if !self.alerts.iter().any(|a| a.flag == flag) {
            self.alerts.push(RaisedAlert { flag, alert_id });
        }
    }

    /// Marks the session terminal after the final report.
    pub fn complete(&mut self, at: Timestamp) -> Result<(), IntakeError> {
        if self.stage == IntakeStage::Completed {
            return Err(IntakeError::Completed(self.id));
        }
        self.advance(IntakeStage::Completed)?;
        self.updated_at = at;
        Ok(())
    }

    fn collecting_stage(&self, action: &'static str) -> Result<Stage, IntakeError> {
        if self.stage == IntakeStage::Completed {
            return Err(IntakeError::Completed(self.id));
        }
        self.stage
            .collecting()
            .ok_or_else(|| IntakeError::wrong_stage(action, self.stage))
    }

    fn progress_mut(&mut self, stage: Stage) -> Result<&mut StageProgress, IntakeError> {
        match stage {
            Stage::History => Ok(&mut self.history),
            Stage::Short => Ok(&mut self.short),
            Stage::Deep => {
                let current = self.stage;
                self.deep
                    .as_mut()
                    .ok_or_else(|| IntakeError::wrong_stage("collect deep answers", current))
            }
        }
    }

    fn advance(&mut self, target: IntakeStage) -> Result<(), IntakeError> {
        let current = self.stage;
        self.stage = current
            .transition_to(target)
            .map_err(|_| IntakeError::wrong_stage("advance", current))?;
        Ok(())
    }
}
