//! Property and scenario tests for the pure scoring pipeline.
//!
//! Scorer -> FlagDetector -> TriageResolver over generated answer sets.

use proptest::prelude::*;

use intake_triage::domain::assessment::{
    Answer, AnswerSet, RiskFlag, Scorer, Severity, TriageLevel, TriageResolver,
};
use intake_triage::domain::catalog::{ids, ClinicalDomain, QuestionCatalog, Stage};

// =============================================================================
// Helpers
// =============================================================================

fn answer_set(stage: Stage, values: &[u8]) -> AnswerSet {
    let sequence = QuestionCatalog::global().core_sequence(stage);
    assert_eq!(sequence.len(), values.len());
    let mut answers = AnswerSet::new();
    for (id, value) in sequence.into_iter().zip(values) {
        answers.insert(id, Answer::Value(*value));
    }
    answers
}

fn short_triage(answers: &AnswerSet) -> TriageLevel {
    let result = Scorer::score_short(answers);
    TriageResolver::resolve(result.severity, &result.auto_flags).triage_level
}

fn deep_triage(answers: &AnswerSet) -> TriageLevel {
    let result = Scorer::score_deep(answers);
    TriageResolver::resolve(result.severity, &result.risk_flags).triage_level
}

fn short_values() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=3, 10)
}

fn deep_values() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=3, 17)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn short_total_is_sum_within_range(values in short_values()) {
        let result = Scorer::score_short(&answer_set(Stage::Short, &values));
        let sum: u32 = values.iter().map(|v| u32::from(*v)).sum();

        prop_assert_eq!(result.total, sum);
        prop_assert!(result.total <= 30);
        prop_assert_eq!(result.severity, Severity::for_short_total(result.total));
    }

    #[test]
    fn deep_domain_scores_sum_to_total(values in deep_values()) {
        let result = Scorer::score_deep(&answer_set(Stage::Deep, &values));

        prop_assert!(result.total <= 51);
        prop_assert_eq!(result.domain_scores.total(), result.total);
        prop_assert_eq!(result.severity, Severity::for_deep_total(result.total));
    }

    #[test]
    fn raising_a_short_answer_never_lowers_outputs(
        values in short_values(),
        index in 0usize..10,
    ) {
        prop_assume!(values[index] < 3);
        let mut raised = values.clone();
        raised[index] += 1;

        let before_set = answer_set(Stage::Short, &values);
        let after_set = answer_set(Stage::Short, &raised);
        let before = Scorer::score_short(&before_set);
        let after = Scorer::score_short(&after_set);

        prop_assert!(after.total > before.total);
        prop_assert!(after.severity >= before.severity);
        prop_assert!(short_triage(&after_set) >= short_triage(&before_set));
    }

    #[test]
    fn raising_a_deep_answer_never_lowers_outputs(
        values in deep_values(),
        index in 0usize..17,
    ) {
        prop_assume!(values[index] < 3);
        let mut raised = values.clone();
        raised[index] += 1;

        let before_set = answer_set(Stage::Deep, &values);
        let after_set = answer_set(Stage::Deep, &raised);
        let before = Scorer::score_deep(&before_set);
        let after = Scorer::score_deep(&after_set);

        prop_assert!(after.total > before.total);
        prop_assert!(after.severity >= before.severity);
        prop_assert!(deep_triage(&after_set) >= deep_triage(&before_set));
    }

    #[test]
    fn severity_is_monotonic_in_total(a in 0u32..=30, b in 0u32..=30) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Severity::for_short_total(low) <= Severity::for_short_total(high));
    }

    #[test]
    fn scoring_and_triage_are_idempotent(values in short_values()) {
        let answers = answer_set(Stage::Short, &values);

        let first = Scorer::score_short(&answers);
        let second = Scorer::score_short(&answers);
        prop_assert_eq!(&first, &second);

        let t1 = TriageResolver::resolve(first.severity, &first.auto_flags);
        let t2 = TriageResolver::resolve(second.severity, &second.auto_flags);
        prop_assert_eq!(t1, t2);
    }

    #[test]
    fn any_suicidality_answer_forces_crisis(values in short_values(), q10 in 1u8..=3) {
        let mut answers = answer_set(Stage::Short, &values);
        answers.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(q10));

        let result = Scorer::score_short(&answers);

        prop_assert!(result.needs_deep_screening);
        prop_assert!(result.auto_flags.iter().any(|f| f == RiskFlag::SUICIDALITY_RISK));
        prop_assert_eq!(short_triage(&answers), TriageLevel::PsychiatristCrisis);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_single_suicidality_answer_with_normal_severity() {
    let mut answers = answer_set(Stage::Short, &[0; 10]);
    answers.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(1));

    let result = Scorer::score_short(&answers);
    let triage = TriageResolver::resolve(result.severity, &result.auto_flags);

    assert_eq!(result.total, 1);
    assert_eq!(result.severity, Severity::Normal);
    assert_eq!(
        result.auto_flags,
        vec![RiskFlag::from_static(RiskFlag::SUICIDALITY_RISK)]
    );
    assert!(result.needs_deep_screening);
    assert_eq!(triage.triage_level, TriageLevel::PsychiatristCrisis);
    assert!(!triage.urgent_flags.is_empty());
    assert_eq!(triage.booking_action(), Some("Find Emergency Care"));
}

#[test]
fn scenario_psychosis_answers_override_total() {
    let mut answers = answer_set(Stage::Deep, &[1; 17]);
    answers.insert(ids::HALLUCINATIONS, Answer::Value(2));
    answers.insert(ids::PARANOID_THOUGHTS, Answer::Value(2));

    let result = Scorer::score_deep(&answers);
    let triage = TriageResolver::resolve(result.severity, &result.risk_flags);

    assert_eq!(result.domain_scores.get(ClinicalDomain::Psychosis), 4);
    assert!(result
        .risk_flags
        .iter()
        .any(|f| f == RiskFlag::PSYCHOSIS_SYMPTOMS));
    assert_eq!(triage.triage_level, TriageLevel::PsychiatristCrisis);
}

#[test]
fn scenario_low_total_without_flags_is_monitor() {
    // q1..q4 carry the five points; everything else, including q10, is zero.
    let answers = answer_set(Stage::Short, &[2, 1, 1, 1, 0, 0, 0, 0, 0, 0]);

    let result = Scorer::score_short(&answers);
    let triage = TriageResolver::resolve(result.severity, &result.auto_flags);

    assert_eq!(result.total, 5);
    assert_eq!(result.severity, Severity::Normal);
    assert!(result.auto_flags.is_empty());
    assert!(!result.needs_deep_screening);
    assert_eq!(triage.triage_level, TriageLevel::Monitor);
    assert_eq!(triage.booking_action(), None);
}

#[test]
fn flags_never_lower_a_severe_baseline() {
    let answers = answer_set(Stage::Short, &[3; 10]);

    let result = Scorer::score_short(&answers);
    let triage = TriageResolver::resolve(result.severity, &result.auto_flags);

    assert_eq!(result.severity, Severity::Severe);
    assert_eq!(triage.triage_level, TriageLevel::PsychiatristCrisis);
}
