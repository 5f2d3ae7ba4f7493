//! Adaptive Question Selector - session-local stage sequence with follow-up splicing.

use serde::{Deserialize, Serialize};

use super::answers::AnswerSet;
use crate::domain::catalog::{Answer, QuestionCatalog, Stage};
use crate::domain::foundation::QuestionId;

/// Record of follow-ups spliced in after an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveAdjustment {
    pub trigger: QuestionId,
    pub added: Vec<QuestionId>,
    pub note: String,
}

/// The ordered question sequence of one stage for one session.
///
/// Starts as a copy of the catalog's core slice and only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSequence {
    stage: Stage,
    ids: Vec<QuestionId>,
    adjustments: Vec<AdaptiveAdjustment>,
}

impl QuestionSequence {
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            stage,
            ids: QuestionCatalog::global().core_sequence(stage),
            adjustments: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn ids(&self) -> &[QuestionId] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|q| q.as_str() == id)
    }

    pub fn adjustments(&self) -> &[AdaptiveAdjustment] {
        &self.adjustments
    }

    /// Splices in follow-ups if the answer meets the question's trigger.
    ///
    /// Already-present ids are skipped, so repeated answers are no-ops.
    /// Returns the adjustment when at least one id was added.
    pub fn apply(&mut self, question_id: &str, answer: &Answer) -> Option<AdaptiveAdjustment> {
        let question = QuestionCatalog::global().question(question_id)?;
        if question.stage != self.stage {
            return None;
        }

        let added: Vec<QuestionId> = question
            .follow_ups_for(answer)
            .iter()
            .filter(|id| !self.contains(id))
            .map(|id| QuestionId::from(*id))
            .collect();
        if added.is_empty() {
            return None;
        }

        self.ids.extend(added.iter().cloned());
        let adjustment = AdaptiveAdjustment {
            trigger: QuestionId::from(question.id),
            note: format!(
                "{} answered {}; added {}",
                question.id,
                answer.normalized(),
                added
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            added,
        };
        self.adjustments.push(adjustment.clone());
        Some(adjustment)
    }

    /// Applies every answer in the set, in id order.
    pub fn apply_all(&mut self, answers: &AnswerSet) -> Vec<AdaptiveAdjustment> {
        answers
            .iter()
            .filter_map(|(id, answer)| self.apply(id.as_str(), answer))
            .collect()
    }

    /// Sequence ids with no recorded answer.
    pub fn unanswered(&self, answers: &AnswerSet) -> Vec<QuestionId> {
        self.ids
            .iter()
            .filter(|id| !answers.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Complete once the full, possibly grown, sequence is answered.
    pub fn is_complete(&self, answers: &AnswerSet) -> bool {
        self.ids.iter().all(|id| answers.contains(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ids;

    #[test]
    fn starts_as_core_slice() {
        let sequence = QuestionSequence::for_stage(Stage::Short);
        assert_eq!(sequence.ids().len(), 10);
        assert!(sequence.adjustments().is_empty());
    }

    #[test]
    fn trigger_appends_follow_ups_once() {
        let mut sequence = QuestionSequence::for_stage(Stage::Short);

        let adjustment = sequence
            .apply(ids::SUICIDAL_THOUGHTS, &Answer::Value(1))
            .unwrap();
        assert_eq!(
            adjustment.added,
            vec![
                QuestionId::from("q10a_suicide_plan"),
                QuestionId::from("q10b_means_access")
            ]
        );
        assert_eq!(sequence.ids().len(), 12);

        assert!(sequence.apply(ids::SUICIDAL_THOUGHTS, &Answer::Value(3)).is_none());
        assert_eq!(sequence.ids().len(), 12);
        assert_eq!(sequence.adjustments().len(), 1);
    }

    #[test]
    fn below_threshold_adds_nothing() {
        let mut sequence = QuestionSequence::for_stage(Stage::Deep);
        assert!(sequence.apply(ids::HALLUCINATIONS, &Answer::Value(1)).is_none());
        assert_eq!(sequence.ids().len(), 17);
    }

    #[test]
    fn lowering_an_answer_keeps_spliced_follow_ups() {
        let mut sequence = QuestionSequence::for_stage(Stage::Deep);
        sequence.apply(ids::HALLUCINATIONS, &Answer::Value(3));
        sequence.apply(ids::HALLUCINATIONS, &Answer::Value(0));

        assert!(sequence.contains("d11a_command_hallucinations"));
    }

    #[test]
    fn completion_requires_follow_up_answers() {
        let mut sequence = QuestionSequence::for_stage(Stage::Short);
        let mut answers = AnswerSet::from_pairs(
            sequence.ids().iter().cloned().map(|id| (id, Answer::Value(0))),
        );
        answers.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(2));
        sequence.apply_all(&answers);

        assert!(!sequence.is_complete(&answers));
        assert_eq!(sequence.unanswered(&answers).len(), 2);

        answers.insert("q10a_suicide_plan", Answer::YesNo(false));
        answers.insert("q10b_means_access", Answer::YesNo(false));
        assert!(sequence.is_complete(&answers));
    }

    #[test]
    fn questions_from_other_stages_are_ignored() {
        let mut sequence = QuestionSequence::for_stage(Stage::Short);
        assert!(sequence
            .apply(ids::ACTIVE_SUICIDAL_THOUGHTS, &Answer::Value(3))
            .is_none());
    }
}
