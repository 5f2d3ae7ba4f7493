//! Question Catalog - static definitions for every intake question.
//!
//! Pure data. The catalog is built once and shared by reference; per-session
//! adaptive growth works on copies of a stage's id sequence, never on the
//! catalog itself.

mod deep;
mod history;
mod question;
mod short;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::foundation::QuestionId;

pub use question::{
    AdaptiveLogic, Answer, AnswerOption, ClinicalDomain, Question, ResponseFormat, Stage,
};

/// Well-known question ids referenced by the flag rules.
pub mod ids {
    pub use super::deep::{
        ACTIVE_SUICIDAL_THOUGHTS, FUNCTIONAL_IMPAIRMENT, HALLUCINATIONS, PARANOID_THOUGHTS,
        SLEEP_HOURS_ITEM as DEEP_SLEEP_HOURS,
    };
    pub use super::short::{
        DAILY_FUNCTIONING, DIGITAL_ESCAPE, SLEEP_HOURS_ITEM as SHORT_SLEEP_HOURS,
        SUICIDAL_THOUGHTS,
    };
}

static CATALOG: Lazy<QuestionCatalog> = Lazy::new(QuestionCatalog::build);

/// Read-only index over all stages.
#[derive(Debug)]
pub struct QuestionCatalog {
    by_id: HashMap<&'static str, &'static Question>,
}

impl QuestionCatalog {
    /// Returns the process-wide catalog.
    pub fn global() -> &'static QuestionCatalog {
        &CATALOG
    }

    fn build() -> Self {
        let by_id = [history::QUESTIONS, short::QUESTIONS, deep::QUESTIONS]
            .into_iter()
            .flatten()
            .map(|q| (q.id, q))
            .collect();
        Self { by_id }
    }

    /// Looks up a question by id.
    pub fn question(&self, id: &str) -> Option<&'static Question> {
        self.by_id.get(id).copied()
    }

    /// All questions of a stage, core items first, then follow-ups.
    pub fn stage_questions(&self, stage: Stage) -> &'static [Question] {
        match stage {
            Stage::History => history::QUESTIONS,
            Stage::Short => short::QUESTIONS,
            Stage::Deep => deep::QUESTIONS,
        }
    }

    /// Core (non follow-up) questions of a stage, in presentation order.
    pub fn core_questions(&self, stage: Stage) -> impl Iterator<Item = &'static Question> {
        self.stage_questions(stage)
            .iter()
            .filter(|q| !q.is_follow_up)
    }

    /// The initial ordered question sequence for a stage.
    pub fn core_sequence(&self, stage: Stage) -> Vec<QuestionId> {
        self.core_questions(stage)
            .map(|q| QuestionId::from(q.id))
            .collect()
    }

    /// Maximum possible total for a stage.
    pub fn max_total(&self, stage: Stage) -> u32 {
        self.core_questions(stage)
            .map(|q| u32::from(q.max_score()))
            .sum()
    }

    /// Maximum possible score for one domain of a stage.
    pub fn max_domain_score(&self, stage: Stage, domain: ClinicalDomain) -> u32 {
        self.core_questions(stage)
            .filter(|q| q.domain == Some(domain))
            .map(|q| u32::from(q.max_score()))
            .sum()
    }
}
