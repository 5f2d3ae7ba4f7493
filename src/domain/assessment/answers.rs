//! AnswerSet - a patient's recorded responses for one stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::catalog::{Answer, QuestionCatalog, Stage};
use crate::domain::foundation::QuestionId;

/// Mapping from question id to the selected answer.
///
/// Serializes as a plain JSON object: `{"q1_low_mood": 2, "q10a_suicide_plan": false}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `(id, answer)` pairs; later pairs win.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Answer)>,
        K: Into<QuestionId>,
    {
        Self {
            answers: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Records an answer, returning the previous one if it was changed.
    pub fn insert(&mut self, id: impl Into<QuestionId>, answer: Answer) -> Option<Answer> {
        self.answers.insert(id.into(), answer)
    }

    pub fn get(&self, id: &str) -> Option<&Answer> {
        self.answers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.answers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Answer)> {
        self.answers.iter()
    }

    /// Copies every answer from `other` into this set.
    pub fn merge(&mut self, other: &AnswerSet) {
        for (id, answer) in other.iter() {
            self.answers.insert(id.clone(), *answer);
        }
    }

    /// Checks completeness against `sequence` and permissibility against the catalog.
    ///
    /// Answers to questions outside `sequence` (unknown ids, other stages,
    /// follow-ups that were never triggered) are reported as invalid.
    pub fn validate(
        &self,
        stage: Stage,
        sequence: &[QuestionId],
        catalog: &QuestionCatalog,
    ) -> Result<(), IncompleteAnswerSet> {
        let missing: Vec<QuestionId> = sequence
            .iter()
            .filter(|id| !self.contains(id.as_str()))
            .cloned()
            .collect();

        let invalid: Vec<QuestionId> = self
            .iter()
            .filter(|(id, answer)| {
                if !sequence.contains(id) {
                    return true;
                }
                match catalog.question(id.as_str()) {
                    Some(question) => question.stage != stage || !question.accepts(answer),
                    None => true,
                }
            })
            .map(|(id, _)| id.clone())
            .collect();

        if missing.is_empty() && invalid.is_empty() {
            Ok(())
        } else {
            Err(IncompleteAnswerSet {
                stage,
                missing,
                invalid,
            })
        }
    }
}

/// An answer set that cannot be scored yet.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{stage} answers incomplete: {} missing, {} invalid", missing.len(), invalid.len())]
pub struct IncompleteAnswerSet {
    pub stage: Stage,
    pub missing: Vec<QuestionId>,
    pub invalid: Vec<QuestionId>,
}

impl IncompleteAnswerSet {
    /// Every offending question id, missing first.
    pub fn offending_ids(&self) -> Vec<QuestionId> {
        self.missing
            .iter()
            .chain(self.invalid.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_sequence() -> Vec<QuestionId> {
        QuestionCatalog::global().core_sequence(Stage::Short)
    }

    fn all_short(value: u8) -> AnswerSet {
        AnswerSet::from_pairs(short_sequence().into_iter().map(|id| (id, Answer::Value(value))))
    }

    #[test]
    fn deserializes_from_json_object() {
        let json = r#"{"q1_low_mood": 2, "q10a_suicide_plan": false}"#;
        let answers: AnswerSet = serde_json::from_str(json).unwrap();

        assert_eq!(answers.get("q1_low_mood"), Some(&Answer::Value(2)));
        assert_eq!(answers.get("q10a_suicide_plan"), Some(&Answer::YesNo(false)));
    }

    #[test]
    fn complete_valid_set_passes() {
        let answers = all_short(1);
        let result = answers.validate(Stage::Short, &short_sequence(), QuestionCatalog::global());
        assert!(result.is_ok());
    }

    #[test]
    fn missing_answers_are_listed() {
        let mut answers = AnswerSet::new();
        answers.insert("q1_low_mood", Answer::Value(0));

        let err = answers
            .validate(Stage::Short, &short_sequence(), QuestionCatalog::global())
            .unwrap_err();

        assert_eq!(err.missing.len(), 9);
        assert!(err.invalid.is_empty());
        assert!(!err.missing.contains(&QuestionId::from("q1_low_mood")));
    }

    #[test]
    fn out_of_range_value_is_invalid() {
        let mut answers = all_short(0);
        answers.insert("q3_nervousness", Answer::Value(4));

        let err = answers
            .validate(Stage::Short, &short_sequence(), QuestionCatalog::global())
            .unwrap_err();

        assert!(err.missing.is_empty());
        assert_eq!(err.invalid, vec![QuestionId::from("q3_nervousness")]);
    }

    #[test]
    fn unknown_and_foreign_stage_ids_are_invalid() {
        let mut answers = all_short(0);
        answers.insert("zz_unknown", Answer::Value(0));
        answers.insert("d1_depressed_mood", Answer::Value(1));

        let err = answers
            .validate(Stage::Short, &short_sequence(), QuestionCatalog::global())
            .unwrap_err();

        assert_eq!(err.invalid.len(), 2);
        assert_eq!(err.offending_ids().len(), 2);
    }

    #[test]
    fn untriggered_follow_up_is_invalid() {
        let mut answers = all_short(0);
        answers.insert("q10a_suicide_plan", Answer::YesNo(true));

        let err = answers
            .validate(Stage::Short, &short_sequence(), QuestionCatalog::global())
            .unwrap_err();

        assert_eq!(err.invalid, vec![QuestionId::from("q10a_suicide_plan")]);
    }

    #[test]
    fn merge_overwrites_existing_answers() {
        let mut base = AnswerSet::from_pairs([("q1_low_mood", Answer::Value(0))]);
        let update = AnswerSet::from_pairs([("q1_low_mood", Answer::Value(3))]);

        base.merge(&update);

        assert_eq!(base.get("q1_low_mood"), Some(&Answer::Value(3)));
        assert_eq!(base.len(), 1);
    }
}
