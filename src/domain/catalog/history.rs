//! Background history stage. Unscored; feeds the clinician report.

use super::question::{AnswerOption, Question, ResponseFormat, Stage, YES_NO_UNSCORED};

const AGE_RANGES: &[AnswerOption] = &[
    AnswerOption::unscored(0, "18-24"),
    AnswerOption::unscored(1, "25-34"),
    AnswerOption::unscored(2, "35-44"),
    AnswerOption::unscored(3, "45-64"),
    AnswerOption::unscored(4, "65 or older"),
];

const GENDER_IDENTITIES: &[AnswerOption] = &[
    AnswerOption::unscored(0, "Woman"),
    AnswerOption::unscored(1, "Man"),
    AnswerOption::unscored(2, "Non-binary"),
    AnswerOption::unscored(3, "Prefer to self-describe"),
    AnswerOption::unscored(4, "Prefer not to say"),
];

const fn background(
    id: &'static str,
    prompt: &'static str,
    format: ResponseFormat,
    options: &'static [AnswerOption],
) -> Question {
    Question {
        id,
        stage: Stage::History,
        domain: None,
        prompt,
        weight: 1,
        format,
        options,
        is_risk_question: false,
        is_critical_risk: false,
        is_follow_up: false,
        adaptive: None,
    }
}

pub(crate) static QUESTIONS: &[Question] = &[
    background("h1_age_range", "Age range", ResponseFormat::Choice, AGE_RANGES),
    background(
        "h2_gender_identity",
        "Gender identity",
        ResponseFormat::Choice,
        GENDER_IDENTITIES,
    ),
    background(
        "h3_prior_diagnosis",
        "Prior mental health diagnosis",
        ResponseFormat::YesNo,
        YES_NO_UNSCORED,
    ),
    background(
        "h4_current_medication",
        "Currently taking psychiatric medication",
        ResponseFormat::YesNo,
        YES_NO_UNSCORED,
    ),
    background(
        "h5_previous_therapy",
        "Previously in therapy",
        ResponseFormat::YesNo,
        YES_NO_UNSCORED,
    ),
    background(
        "h6_family_history",
        "Family history of mental illness",
        ResponseFormat::YesNo,
        YES_NO_UNSCORED,
    ),
    background(
        "h7_recent_major_stressor",
        "Major stressful life event in the past six months",
        ResponseFormat::YesNo,
        YES_NO_UNSCORED,
    ),
];
