//! Flag Detector - table-driven risk rules, orthogonal to aggregate score.
//!
//! Each rule is evaluated independently so a single alarming answer is never
//! diluted by an otherwise mild total. New rules go in [`RULES`]; the scorer
//! is untouched.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::answers::AnswerSet;
use crate::domain::catalog::{ids, ClinicalDomain, QuestionCatalog, Stage};
use crate::domain::escalation::AlertType;

/// Named risk indicator. The tag set is open; well-known tags are constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskFlag(Cow<'static, str>);

impl RiskFlag {
    pub const SUICIDALITY_RISK: &'static str = "suicidality_risk";
    pub const CRITICAL_SUICIDALITY_RISK: &'static str = "critical_suicidality_risk";
    pub const PSYCHOSIS_SYMPTOMS: &'static str = "psychosis_symptoms";
    pub const CRITICAL_PSYCHOSIS_RISK: &'static str = "critical_psychosis_risk";
    pub const SUBSTANCE_USE_CONCERN: &'static str = "substance_use_concern";
    pub const SEVERE_FUNCTIONAL_IMPAIRMENT: &'static str = "severe_functional_impairment";
    pub const SEVERE_SLEEP_DISTURBANCE: &'static str = "severe_sleep_disturbance";
    pub const COMPULSIVE_DIGITAL_USE: &'static str = "compulsive_digital_use";

    /// Creates a flag from an arbitrary tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// Creates a flag from a static tag without allocating.
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Critical flags raise a CrisisAlert.
    pub fn is_critical(&self) -> bool {
        self.0.starts_with("critical_")
    }

    /// The alert type a critical flag raises, if any.
    pub fn alert_type(&self) -> Option<AlertType> {
        match self.as_str() {
            Self::CRITICAL_SUICIDALITY_RISK => Some(AlertType::SuicideRisk),
            Self::CRITICAL_PSYCHOSIS_RISK => Some(AlertType::PsychosisCrisis),
            _ => None,
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for RiskFlag {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for RiskFlag {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Which stages a rule applies to.
#[derive(Debug, Clone, Copy)]
enum RuleScope {
    AnyStage,
    Only(Stage),
}

impl RuleScope {
    fn covers(self, stage: Stage) -> bool {
        match self {
            RuleScope::AnyStage => true,
            RuleScope::Only(s) => s == stage,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Condition {
    /// Any answered question tagged with the domain has a normalized value >= min.
    DomainItemAtLeast { domain: ClinicalDomain, min: u8 },
    /// Any critical-risk item of the domain meets its critical threshold.
    CriticalItemMet { domain: ClinicalDomain },
    /// Summed core scores of the domain >= min.
    DomainTotalAtLeast { domain: ClinicalDomain, min: u32 },
    /// Any of the listed questions has a normalized value >= min.
    ItemAtLeast { items: &'static [&'static str], min: u8 },
    /// Any of the listed questions has exactly this normalized value.
    ItemEquals { items: &'static [&'static str], value: u8 },
}

#[derive(Debug, Clone, Copy)]
struct FlagRule {
    flag: &'static str,
    scope: RuleScope,
    condition: Condition,
}

static RULES: &[FlagRule] = &[
    FlagRule {
        flag: RiskFlag::SUICIDALITY_RISK,
        scope: RuleScope::AnyStage,
        condition: Condition::DomainItemAtLeast {
            domain: ClinicalDomain::Suicidality,
            min: 1,
        },
    },
    FlagRule {
        flag: RiskFlag::CRITICAL_SUICIDALITY_RISK,
        scope: RuleScope::AnyStage,
        condition: Condition::CriticalItemMet {
            domain: ClinicalDomain::Suicidality,
        },
    },
    FlagRule {
        flag: RiskFlag::PSYCHOSIS_SYMPTOMS,
        scope: RuleScope::AnyStage,
        condition: Condition::ItemAtLeast {
            items: &[ids::HALLUCINATIONS, ids::PARANOID_THOUGHTS],
            min: 2,
        },
    },
    FlagRule {
        flag: RiskFlag::CRITICAL_PSYCHOSIS_RISK,
        scope: RuleScope::AnyStage,
        condition: Condition::CriticalItemMet {
            domain: ClinicalDomain::Psychosis,
        },
    },
    FlagRule {
        flag: RiskFlag::SUBSTANCE_USE_CONCERN,
        scope: RuleScope::AnyStage,
        condition: Condition::DomainTotalAtLeast {
            domain: ClinicalDomain::SubstanceUse,
            min: 4,
        },
    },
    FlagRule {
        flag: RiskFlag::SEVERE_FUNCTIONAL_IMPAIRMENT,
        scope: RuleScope::AnyStage,
        condition: Condition::ItemEquals {
            items: &[ids::DAILY_FUNCTIONING, ids::FUNCTIONAL_IMPAIRMENT],
            value: 3,
        },
    },
    FlagRule {
        flag: RiskFlag::SEVERE_SLEEP_DISTURBANCE,
        scope: RuleScope::AnyStage,
        condition: Condition::ItemEquals {
            items: &[ids::SHORT_SLEEP_HOURS, ids::DEEP_SLEEP_HOURS],
            value: 3,
        },
    },
    FlagRule {
        flag: RiskFlag::COMPULSIVE_DIGITAL_USE,
        scope: RuleScope::Only(Stage::Short),
        condition: Condition::ItemEquals {
            items: &[ids::DIGITAL_ESCAPE],
            value: 3,
        },
    },
];

/// Evaluates the rule table against an answer set.
pub struct FlagDetector;

impl FlagDetector {
    /// Returns every flag whose rule fires, in table order, without duplicates.
    ///
    /// Answers that are not in the catalog or not permissible are ignored.
    pub fn detect(stage: Stage, answers: &AnswerSet) -> Vec<RiskFlag> {
        let catalog = QuestionCatalog::global();
        let mut flags: Vec<RiskFlag> = Vec::new();

        for rule in RULES.iter().filter(|r| r.scope.covers(stage)) {
            if flags.iter().any(|f| f == rule.flag) {
                continue;
            }
            if Self::fires(&rule.condition, stage, answers, catalog) {
                flags.push(RiskFlag::from_static(rule.flag));
            }
        }
        flags
    }

    fn fires(
        condition: &Condition,
        stage: Stage,
        answers: &AnswerSet,
        catalog: &QuestionCatalog,
    ) -> bool {
        let answered = || {
            answers.iter().filter_map(move |(id, answer)| {
                catalog
                    .question(id.as_str())
                    .filter(|q| q.stage == stage && q.accepts(answer))
                    .map(|q| (q, answer))
            })
        };

        match *condition {
            Condition::DomainItemAtLeast { domain, min } => answered()
                .any(|(q, a)| q.domain == Some(domain) && a.normalized() >= min),
            Condition::CriticalItemMet { domain } => answered().any(|(q, a)| {
                q.domain == Some(domain)
                    && q.is_critical_risk
                    && a.normalized() >= q.critical_threshold()
            }),
            Condition::DomainTotalAtLeast { domain, min } => {
                let total: u32 = answered()
                    .filter(|(q, _)| q.domain == Some(domain) && !q.is_follow_up)
                    .filter_map(|(q, a)| q.score_of(a))
                    .map(u32::from)
                    .sum();
                total >= min
            }
            Condition::ItemAtLeast { items, min } => answered()
                .any(|(q, a)| items.contains(&q.id) && a.normalized() >= min),
            Condition::ItemEquals { items, value } => answered()
                .any(|(q, a)| items.contains(&q.id) && a.normalized() == value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Answer;

    fn stage_answers(stage: Stage, value: u8) -> AnswerSet {
        AnswerSet::from_pairs(
            QuestionCatalog::global()
                .core_sequence(stage)
                .into_iter()
                .map(|id| (id, Answer::Value(value))),
        )
    }

    fn tags(flags: &[RiskFlag]) -> Vec<&str> {
        flags.iter().map(|f| f.as_str()).collect()
    }

    #[test]
    fn all_zero_short_answers_raise_no_flags() {
        assert!(FlagDetector::detect(Stage::Short, &stage_answers(Stage::Short, 0)).is_empty());
    }

    #[test]
    fn any_suicidal_thought_flags_risk() {
        let mut answers = stage_answers(Stage::Short, 0);
        answers.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(1));

        let flags = FlagDetector::detect(Stage::Short, &answers);

        assert_eq!(tags(&flags), vec![RiskFlag::SUICIDALITY_RISK]);
    }

    #[test]
    fn active_suicidal_thoughts_at_two_are_critical_and_coexist() {
        let mut answers = stage_answers(Stage::Deep, 0);
        answers.insert(ids::ACTIVE_SUICIDAL_THOUGHTS, Answer::Value(2));

        let flags = FlagDetector::detect(Stage::Deep, &answers);

        assert_eq!(
            tags(&flags),
            vec![RiskFlag::SUICIDALITY_RISK, RiskFlag::CRITICAL_SUICIDALITY_RISK]
        );
        assert!(flags[1].is_critical());
        assert_eq!(flags[1].alert_type(), Some(AlertType::SuicideRisk));
    }

    #[test]
    fn suicide_plan_follow_up_is_critical() {
        let mut answers = stage_answers(Stage::Short, 0);
        answers.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(1));
        answers.insert("q10a_suicide_plan", Answer::YesNo(true));

        let flags = FlagDetector::detect(Stage::Short, &answers);

        assert!(flags.iter().any(|f| f == RiskFlag::CRITICAL_SUICIDALITY_RISK));
    }

    #[test]
    fn psychosis_flag_emitted_once_for_both_items() {
        let mut answers = stage_answers(Stage::Deep, 0);
        answers.insert(ids::HALLUCINATIONS, Answer::Value(2));
        answers.insert(ids::PARANOID_THOUGHTS, Answer::Value(3));

        let flags = FlagDetector::detect(Stage::Deep, &answers);

        assert_eq!(tags(&flags), vec![RiskFlag::PSYCHOSIS_SYMPTOMS]);
    }

    #[test]
    fn command_hallucinations_raise_critical_psychosis() {
        let mut answers = stage_answers(Stage::Deep, 0);
        answers.insert(ids::HALLUCINATIONS, Answer::Value(2));
        answers.insert("d11a_command_hallucinations", Answer::YesNo(true));

        let flags = FlagDetector::detect(Stage::Deep, &answers);

        assert!(flags.iter().any(|f| f == RiskFlag::CRITICAL_PSYCHOSIS_RISK));
        let critical = flags.iter().find(|f| f.is_critical()).unwrap();
        assert_eq!(critical.alert_type(), Some(AlertType::PsychosisCrisis));
    }

    #[test]
    fn substance_concern_uses_domain_total() {
        let mut answers = stage_answers(Stage::Deep, 0);
        answers.insert("d13_alcohol_use", Answer::Value(2));
        answers.insert("d14_drug_use", Answer::Value(1));
        assert!(FlagDetector::detect(Stage::Deep, &answers).is_empty());

        answers.insert("d14_drug_use", Answer::Value(2));
        let flags = FlagDetector::detect(Stage::Deep, &answers);
        assert_eq!(tags(&flags), vec![RiskFlag::SUBSTANCE_USE_CONCERN]);
    }

    #[test]
    fn functioning_and_sleep_rules_require_maximum() {
        let mut answers = stage_answers(Stage::Short, 2);
        answers.insert(ids::SUICIDAL_THOUGHTS, Answer::Value(0));
        assert!(FlagDetector::detect(Stage::Short, &answers).is_empty());

        answers.insert(ids::DAILY_FUNCTIONING, Answer::Value(3));
        answers.insert(ids::SHORT_SLEEP_HOURS, Answer::Value(3));
        let flags = FlagDetector::detect(Stage::Short, &answers);
        assert_eq!(
            tags(&flags),
            vec![
                RiskFlag::SEVERE_FUNCTIONAL_IMPAIRMENT,
                RiskFlag::SEVERE_SLEEP_DISTURBANCE
            ]
        );
    }

    #[test]
    fn digital_escape_rule_is_short_stage_only() {
        let mut short = stage_answers(Stage::Short, 0);
        short.insert(ids::DIGITAL_ESCAPE, Answer::Value(3));

        let flags = FlagDetector::detect(Stage::Short, &short);
        assert_eq!(tags(&flags), vec![RiskFlag::COMPULSIVE_DIGITAL_USE]);

        // Same answers evaluated as another stage: the item is foreign there.
        assert!(FlagDetector::detect(Stage::Deep, &short).is_empty());
    }

    #[test]
    fn flag_serializes_as_plain_string() {
        let flag = RiskFlag::from_static(RiskFlag::PSYCHOSIS_SYMPTOMS);
        assert_eq!(serde_json::to_string(&flag).unwrap(), "\"psychosis_symptoms\"");

        let parsed: RiskFlag = serde_json::from_str("\"psychosis_symptoms\"").unwrap();
        assert_eq!(parsed, flag);
    }

    #[test]
    fn custom_flag_is_not_critical_unless_prefixed() {
        assert!(!RiskFlag::new("eating_disorder_concern").is_critical());
        assert!(RiskFlag::new("critical_other").is_critical());
        assert_eq!(RiskFlag::new("critical_other").alert_type(), None);
    }
}
