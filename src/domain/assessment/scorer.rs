//! Scorer - reduces a completed answer set to totals, domain scores and severity.
//!
//! Callers validate first (see [`AnswerSet::validate`]); unanswered core items
//! contribute zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::answers::AnswerSet;
use super::flags::{FlagDetector, RiskFlag};
use super::severity::Severity;
use crate::domain::catalog::{ClinicalDomain, QuestionCatalog, Stage};

/// Summed score per clinical domain. Every domain is present, zeros included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainScoreBreakdown(BTreeMap<ClinicalDomain, u32>);

impl DomainScoreBreakdown {
    fn zeroed() -> Self {
        Self(ClinicalDomain::ALL.iter().map(|d| (*d, 0)).collect())
    }

    pub fn get(&self, domain: ClinicalDomain) -> u32 {
        self.0.get(&domain).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClinicalDomain, u32)> + '_ {
        self.0.iter().map(|(d, s)| (*d, *s))
    }
}

/// Short questionnaire result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortScreeningResult {
    pub total: u32,
    pub severity: Severity,
    pub needs_deep_screening: bool,
    pub auto_flags: Vec<RiskFlag>,
    pub domain_scores: DomainScoreBreakdown,
}

/// Deep screening result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepScreeningResult {
    pub total: u32,
    pub severity: Severity,
    pub domain_scores: DomainScoreBreakdown,
    pub risk_flags: Vec<RiskFlag>,
}

/// Pure scoring over the global catalog.
pub struct Scorer;

impl Scorer {
    /// Scores the ten short-stage items.
    ///
    /// Deep screening is needed whenever severity is above normal or any
    /// short-stage rule fires; a low total never suppresses a flag.
    pub fn score_short(answers: &AnswerSet) -> ShortScreeningResult {
        let domain_scores = Self::domain_scores(Stage::Short, answers);
        let total = domain_scores.total();
        let severity = Severity::for_short_total(total);
        let auto_flags = FlagDetector::detect(Stage::Short, answers);
        let needs_deep_screening = severity != Severity::Normal || !auto_flags.is_empty();

        ShortScreeningResult {
            total,
            severity,
            needs_deep_screening,
            auto_flags,
            domain_scores,
        }
    }

    /// Scores the seventeen deep-stage items with domain aggregation and flags.
    pub fn score_deep(answers: &AnswerSet) -> DeepScreeningResult {
        let domain_scores = Self::domain_scores(Stage::Deep, answers);
        let total = domain_scores.total();

        DeepScreeningResult {
            total,
            severity: Severity::for_deep_total(total),
            domain_scores,
            risk_flags: FlagDetector::detect(Stage::Deep, answers),
        }
    }

    /// Per-domain sums over a stage's core questions. Follow-ups never count.
    pub fn domain_scores(stage: Stage, answers: &AnswerSet) -> DomainScoreBreakdown {
        let mut breakdown = DomainScoreBreakdown::zeroed();

        for question in QuestionCatalog::global().core_questions(stage) {
            let Some(domain) = question.domain else {
                continue;
            };
            let score = answers
                .get(question.id)
                .and_then(|a| question.score_of(a))
                .map(u32::from)
                .unwrap_or(0);
            *breakdown.0.entry(domain).or_insert(0) += score;
        }
        breakdown
    }
}
