//! Patient- and clinician-facing reports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::session::AssessmentSession;
use crate::domain::assessment::{
    AnswerSet, DomainScoreBreakdown, RiskFlag, Severity, TriageLevel, TriageResolver,
};
use crate::domain::catalog::{ClinicalDomain, QuestionCatalog, Stage};
use crate::domain::foundation::{AlertId, PatientRef, SessionId, Timestamp};

/// What the patient sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientReport {
    pub session_id: SessionId,
    pub severity: Severity,
    pub triage_level: TriageLevel,
    pub recommendations: Vec<String>,
    pub urgent_flags: Vec<RiskFlag>,
    /// Scheduling label; absent for `monitor`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_action: Option<String>,
    pub deep_screening_skipped: bool,
    /// True when the report is the conservative fallback.
    pub degraded: bool,
}

impl PatientReport {
    /// Clinically safe result used when normal report generation fails.
    pub fn conservative_fallback(session_id: SessionId) -> Self {
        let outcome = TriageResolver::resolve(Severity::Severe, &[]);
        let mut recommendations = vec![
            "We could not finish processing your answers. A clinician will review them with you as soon as possible."
                .to_string(),
        ];
        recommendations.extend(outcome.recommendations);
        Self {
            session_id,
            severity: Severity::Severe,
            triage_level: TriageLevel::PsychiatristCrisis,
            recommendations,
            urgent_flags: Vec::new(),
            booking_action: TriageLevel::PsychiatristCrisis
                .booking_action()
                .map(str::to_string),
            deep_screening_skipped: false,
            degraded: true,
        }
    }
}

/// One history answer rendered for the clinician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicItem {
    pub label: String,
    pub value: String,
}

/// Score summary for one clinical domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSummary {
    pub domain: ClinicalDomain,
    pub score: u32,
    pub max_score: u32,
    /// Sum of score x clinical weight; ranks the list.
    pub weighted_load: u32,
    pub elevated: bool,
}

/// What the reviewing clinician sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicianReport {
    pub session_id: SessionId,
    pub patient_ref: PatientRef,
    pub scored_stage: Stage,
    pub short_total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_total: Option<u32>,
    pub demographics: Vec<DemographicItem>,
    pub symptom_domains: Vec<DomainSummary>,
    pub risk_flags: Vec<RiskFlag>,
    pub interpretation: String,
    pub differentials: Vec<String>,
    pub suggested_questions: Vec<String>,
    pub crisis_alerts: Vec<AlertId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub patient: PatientReport,
    /// Absent only when the patient report is a fallback.
    pub clinician: Option<ClinicianReport>,
    pub generated_at: Timestamp,
}

/// Faults that force the conservative fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("short screening result is missing")]
    MissingShortResult,

    #[error("deep screening completed without a result")]
    MissingDeepResult,
}

/// Assembles reports from a session ready for reporting.
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn build(session: &AssessmentSession, at: Timestamp) -> Result<FinalReport, ReportError> {
        let short = session
            .short_result()
            .ok_or(ReportError::MissingShortResult)?;
        let deep_done = session.deep().is_some_and(|d| d.is_completed());
        if deep_done && session.deep_result().is_none() {
            return Err(ReportError::MissingDeepResult);
        }

        let severity = session.final_severity().unwrap_or(short.severity);
        let flags = session.final_flags();
        let triage = TriageResolver::resolve(severity, &flags);

        let patient = PatientReport {
            session_id: session.id(),
            severity,
            booking_action: triage.booking_action().map(str::to_string),
            triage_level: triage.triage_level,
            recommendations: triage.recommendations,
            urgent_flags: triage.urgent_flags,
            deep_screening_skipped: session.deep_skipped(),
            degraded: false,
        };

        let (scored_stage, domain_scores, answers) = match (session.deep_result(), session.deep()) {
            (Some(deep), Some(progress)) => (Stage::Deep, &deep.domain_scores, progress.answers()),
            _ => (Stage::Short, &short.domain_scores, session.short().answers()),
        };
        let symptom_domains = Self::domain_summaries(scored_stage, domain_scores, answers);
        let history = session.history().answers();

        let clinician = ClinicianReport {
            session_id: session.id(),
            patient_ref: session.patient_ref().clone(),
            scored_stage,
            short_total: short.total,
            deep_total: session.deep_result().map(|d| d.total),
            demographics: Self::demographics(history),
            interpretation: Self::interpretation(session, severity, &symptom_domains, &flags),
            differentials: Self::differentials(&symptom_domains, &flags),
            suggested_questions: Self::suggested_questions(&symptom_domains, &flags, history),
            symptom_domains,
            risk_flags: flags,
            crisis_alerts: session.alerts().iter().map(|a| a.alert_id).collect(),
        };

        Ok(FinalReport {
            patient,
            clinician: Some(clinician),
            generated_at: at,
        })
    }

    /// Fallback report with no clinician section.
    pub fn fallback(session_id: SessionId, at: Timestamp) -> FinalReport {
        FinalReport {
            patient: PatientReport::conservative_fallback(session_id),
            clinician: None,
            generated_at: at,
        }
    }

    fn demographics(history: &AnswerSet) -> Vec<DemographicItem> {
        QuestionCatalog::global()
            .core_questions(Stage::History)
            .map(|q| {
                let value = history
                    .get(q.id)
                    .and_then(|a| q.option_for(a.normalized()))
                    .map(|o| o.label)
                    .unwrap_or("Not answered");
                DemographicItem {
                    label: q.prompt.to_string(),
                    value: value.to_string(),
                }
            })
            .collect()
    }

    fn domain_summaries(
        stage: Stage,
        scores: &DomainScoreBreakdown,
        answers: &AnswerSet,
    ) -> Vec<DomainSummary> {
        let catalog = QuestionCatalog::global();
        let mut summaries: Vec<DomainSummary> = ClinicalDomain::ALL
            .iter()
            .map(|&domain| {
                let max_score = catalog.max_domain_score(stage, domain);
                let weighted_load = catalog
                    .core_questions(stage)
                    .filter(|q| q.domain == Some(domain))
                    .filter_map(|q| {
                        let score = answers.get(q.id).and_then(|a| q.score_of(a))?;
                        Some(u32::from(score) * u32::from(q.weight))
                    })
                    .sum();
                let score = scores.get(domain);
                DomainSummary {
                    domain,
                    score,
                    max_score,
                    weighted_load,
                    elevated: score > 0 && score * 2 >= max_score,
                }
            })
            .filter(|s| s.max_score > 0)
            .collect();
        summaries.sort_by(|a, b| b.weighted_load.cmp(&a.weighted_load));
        summaries
    }

    fn interpretation(
        session: &AssessmentSession,
        severity: Severity,
        domains: &[DomainSummary],
        flags: &[RiskFlag],
    ) -> String {
        let elevated: Vec<&str> = domains
            .iter()
            .filter(|d| d.elevated)
            .map(|d| d.domain.label())
            .collect();

        let mut text = format!("Overall severity is {}.", severity);
        if let Some(short) = session.short_result() {
            text.push_str(&format!(" Short screening total {}/30.", short.total));
        }
        match (session.deep_result(), session.deep_skipped()) {
            (Some(deep), _) => text.push_str(&format!(" Deep screening total {}/51.", deep.total)),
            (None, true) => text.push_str(" Deep screening was indicated but declined by the patient."),
            (None, false) => {}
        }
        if elevated.is_empty() {
            text.push_str(" No symptom domain is elevated.");
        } else {
            text.push_str(&format!(" Elevated domains: {}.", elevated.join(", ")));
        }
        if !flags.is_empty() {
            let tags: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
            text.push_str(&format!(" Risk flags: {}.", tags.join(", ")));
        }
        text
    }

    fn differentials(domains: &[DomainSummary], flags: &[RiskFlag]) -> Vec<String> {
        let elevated = |domain: ClinicalDomain| {
            domains.iter().any(|d| d.domain == domain && d.elevated)
        };
        let flagged = |tag: &str| flags.iter().any(|f| f == tag);

        let candidates: [(bool, &str); 8] = [
            (
                elevated(ClinicalDomain::Depression) && elevated(ClinicalDomain::Anxiety),
                "Mixed anxiety-depressive presentation",
            ),
            (elevated(ClinicalDomain::Depression), "Major depressive disorder"),
            (elevated(ClinicalDomain::Anxiety), "Generalized anxiety disorder"),
            (elevated(ClinicalDomain::Mania), "Bipolar spectrum disorder"),
            (
                elevated(ClinicalDomain::Psychosis) || flagged(RiskFlag::PSYCHOSIS_SYMPTOMS),
                "Primary psychotic disorder",
            ),
            (
                elevated(ClinicalDomain::SubstanceUse) || flagged(RiskFlag::SUBSTANCE_USE_CONCERN),
                "Substance use disorder",
            ),
            (flagged(RiskFlag::SEVERE_SLEEP_DISTURBANCE), "Insomnia disorder"),
            (flagged(RiskFlag::COMPULSIVE_DIGITAL_USE), "Problematic internet use"),
        ];
        candidates
            .into_iter()
            .filter(|(applies, _)| *applies)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    fn suggested_questions(
        domains: &[DomainSummary],
        flags: &[RiskFlag],
        history: &AnswerSet,
    ) -> Vec<String> {
        let elevated = |domain: ClinicalDomain| {
            domains.iter().any(|d| d.domain == domain && d.elevated)
        };
        let flagged = |tag: &str| flags.iter().any(|f| f == tag);

        let mut questions = Vec::new();
        if flagged(RiskFlag::SUICIDALITY_RISK) || elevated(ClinicalDomain::Suicidality) {
            questions.push("Complete a structured suicide risk assessment covering intent, plan, means and protective factors.");
        }
        if flagged(RiskFlag::PSYCHOSIS_SYMPTOMS) || elevated(ClinicalDomain::Psychosis) {
            questions.push("Explore onset, content and insight for perceptual disturbances; ask about command hallucinations.");
        }
        if elevated(ClinicalDomain::Mania) {
            questions.push("Ask about the duration of elevated mood episodes and any prior manic or hypomanic episodes.");
        }
        if flagged(RiskFlag::SUBSTANCE_USE_CONCERN) || elevated(ClinicalDomain::SubstanceUse) {
            questions.push("Quantify substance use and screen for withdrawal and dependence.");
        }
        if elevated(ClinicalDomain::Depression) {
            questions.push("Establish the duration of low mood and any previous depressive episodes.");
        }
        if elevated(ClinicalDomain::Anxiety) {
            questions.push("Identify anxiety triggers and the extent of avoidance.");
        }
        if elevated(ClinicalDomain::Functioning) || flagged(RiskFlag::SEVERE_FUNCTIONAL_IMPAIRMENT) {
            questions.push("Assess the impact on work, relationships and self-care.");
        }
        if history.get("h4_current_medication").map(|a| a.normalized()) == Some(1) {
            questions.push("Review current psychiatric medication, dose and adherence.");
        }
        questions.into_iter().map(str::to_string).collect()
    }
}
