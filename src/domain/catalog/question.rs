//! Question definitions shared by every intake stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessment stage a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Background history, unscored.
    History,
    /// Ten-item screening questionnaire.
    Short,
    /// Seventeen-item deep screening, only when triggered.
    Deep,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::History => "history",
            Stage::Short => "short",
            Stage::Deep => "deep",
        };
        write!(f, "{}", s)
    }
}

/// Clinical category used for grouping and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalDomain {
    Depression,
    Anxiety,
    Suicidality,
    Mania,
    Psychosis,
    SubstanceUse,
    Functioning,
}

impl ClinicalDomain {
    pub const ALL: [ClinicalDomain; 7] = [
        ClinicalDomain::Depression,
        ClinicalDomain::Anxiety,
        ClinicalDomain::Suicidality,
        ClinicalDomain::Mania,
        ClinicalDomain::Psychosis,
        ClinicalDomain::SubstanceUse,
        ClinicalDomain::Functioning,
    ];

    /// Returns the display label for this domain.
    pub fn label(&self) -> &'static str {
        match self {
            ClinicalDomain::Depression => "Depression",
            ClinicalDomain::Anxiety => "Anxiety",
            ClinicalDomain::Suicidality => "Suicidality",
            ClinicalDomain::Mania => "Mania",
            ClinicalDomain::Psychosis => "Psychosis",
            ClinicalDomain::SubstanceUse => "Substance use",
            ClinicalDomain::Functioning => "Functioning",
        }
    }
}

impl fmt::Display for ClinicalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Ordered 0..=3 rating.
    Scale,
    /// No = 0, Yes = 1.
    YesNo,
    /// Categorical pick, unscored (history only).
    Choice,
}

/// One permissible discrete answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub value: u8,
    pub score: u8,
    pub label: &'static str,
}

impl AnswerOption {
    /// Option whose score contribution equals its value.
    pub const fn scored(value: u8, label: &'static str) -> Self {
        Self {
            value,
            score: value,
            label,
        }
    }

    /// Option that never contributes to a score.
    pub const fn unscored(value: u8, label: &'static str) -> Self {
        Self {
            value,
            score: 0,
            label,
        }
    }
}

/// Follow-up splicing rule attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdaptiveLogic {
    /// Normalized answer value at or above which follow-ups are added.
    pub trigger_threshold: u8,
    /// Follow-up question ids, in the order they are appended.
    pub follow_ups: &'static [&'static str],
}

/// A recorded response.
///
/// Deserializes from a bare number (scale or choice value) or a boolean
/// (yes/no), so answer sets read naturally as JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Value(u8),
    YesNo(bool),
}

impl Answer {
    /// Scale value, or 1/0 for yes/no.
    pub fn normalized(&self) -> u8 {
        match self {
            Answer::Value(v) => *v,
            Answer::YesNo(true) => 1,
            Answer::YesNo(false) => 0,
        }
    }
}

/// Immutable catalog question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub stage: Stage,
    pub domain: Option<ClinicalDomain>,
    pub prompt: &'static str,
    /// Clinical weight (1..=3); does not enter unweighted totals.
    pub weight: u8,
    pub format: ResponseFormat,
    pub options: &'static [AnswerOption],
    pub is_risk_question: bool,
    pub is_critical_risk: bool,
    /// Follow-ups are only asked when spliced in by adaptive logic.
    pub is_follow_up: bool,
    pub adaptive: Option<AdaptiveLogic>,
}

impl Question {
    /// Looks up the option matching a normalized value.
    pub fn option_for(&self, value: u8) -> Option<&'static AnswerOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Returns true if the answer is one of this question's permissible values.
    pub fn accepts(&self, answer: &Answer) -> bool {
        match (self.format, answer) {
            (ResponseFormat::YesNo, Answer::YesNo(_)) => true,
            (_, Answer::Value(v)) => self.option_for(*v).is_some(),
            _ => false,
        }
    }

    /// Score contribution of an answer, or None if it is not permissible.
    pub fn score_of(&self, answer: &Answer) -> Option<u8> {
        if !self.accepts(answer) {
            return None;
        }
        self.option_for(answer.normalized()).map(|o| o.score)
    }

    /// Highest score any option can contribute.
    pub fn max_score(&self) -> u8 {
        self.options.iter().map(|o| o.score).max().unwrap_or(0)
    }

    /// Value at which a critical-risk item is considered met.
    pub fn critical_threshold(&self) -> u8 {
        match self.format {
            ResponseFormat::YesNo => 1,
            _ => 2,
        }
    }

    /// Follow-up ids to splice in for this answer, if the trigger is met.
    pub fn follow_ups_for(&self, answer: &Answer) -> &'static [&'static str] {
        match self.adaptive {
            Some(logic) if answer.normalized() >= logic.trigger_threshold => logic.follow_ups,
            _ => &[],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Shared option sets
// ─────────────────────────────────────────────────────────────────────────

pub(crate) const FREQUENCY: &[AnswerOption] = &[
    AnswerOption::scored(0, "Not at all"),
    AnswerOption::scored(1, "Several days"),
    AnswerOption::scored(2, "More than half the days"),
    AnswerOption::scored(3, "Nearly every day"),
];

pub(crate) const SLEEP_HOURS: &[AnswerOption] = &[
    AnswerOption::scored(0, "7 hours or more"),
    AnswerOption::scored(1, "About 6 hours"),
    AnswerOption::scored(2, "About 5 hours"),
    AnswerOption::scored(3, "Less than 5 hours"),
];

pub(crate) const IMPAIRMENT: &[AnswerOption] = &[
    AnswerOption::scored(0, "No difficulty"),
    AnswerOption::scored(1, "Somewhat difficult"),
    AnswerOption::scored(2, "Very difficult"),
    AnswerOption::scored(3, "Unable to manage daily tasks"),
];

pub(crate) const USE_FREQUENCY: &[AnswerOption] = &[
    AnswerOption::scored(0, "Never"),
    AnswerOption::scored(1, "Monthly or less"),
    AnswerOption::scored(2, "Weekly"),
    AnswerOption::scored(3, "Daily or almost daily"),
];

pub(crate) const SEVERITY_RATING: &[AnswerOption] = &[
    AnswerOption::scored(0, "None"),
    AnswerOption::scored(1, "Mild"),
    AnswerOption::scored(2, "Moderate"),
    AnswerOption::scored(3, "Severe"),
];

pub(crate) const YES_NO: &[AnswerOption] = &[
    AnswerOption::scored(0, "No"),
    AnswerOption::scored(1, "Yes"),
];

pub(crate) const YES_NO_UNSCORED: &[AnswerOption] = &[
    AnswerOption::unscored(0, "No"),
    AnswerOption::unscored(1, "Yes"),
];

/// Core scale item scored into its stage total.
pub(crate) const fn scale_item(
    stage: Stage,
    id: &'static str,
    domain: ClinicalDomain,
    weight: u8,
    prompt: &'static str,
    options: &'static [AnswerOption],
) -> Question {
    Question {
        id,
        stage,
        domain: Some(domain),
        prompt,
        weight,
        format: ResponseFormat::Scale,
        options,
        is_risk_question: false,
        is_critical_risk: false,
        is_follow_up: false,
        adaptive: None,
    }
}

/// Yes/no follow-up spliced in by adaptive logic, never part of totals.
pub(crate) const fn yes_no_follow_up(
    stage: Stage,
    id: &'static str,
    domain: ClinicalDomain,
    weight: u8,
    prompt: &'static str,
) -> Question {
    Question {
        id,
        stage,
        domain: Some(domain),
        prompt,
        weight,
        format: ResponseFormat::YesNo,
        options: YES_NO,
        is_risk_question: true,
        is_critical_risk: false,
        is_follow_up: true,
        adaptive: None,
    }
}
