//! Short screening questionnaire: ten core items rated 0..=3 (max 30).

use super::question::{
    scale_item, yes_no_follow_up, AdaptiveLogic, ClinicalDomain, Question, Stage, FREQUENCY,
    IMPAIRMENT, SLEEP_HOURS, USE_FREQUENCY,
};

use ClinicalDomain::*;

pub const SUICIDAL_THOUGHTS: &str = "q10_suicidal_thoughts";
pub const SLEEP_HOURS_ITEM: &str = "q5_sleep_hours";
pub const DIGITAL_ESCAPE: &str = "q7_digital_escape";
pub const DAILY_FUNCTIONING: &str = "q9_daily_functioning";

pub(crate) static QUESTIONS: &[Question] = &[
    scale_item(
        Stage::Short,
        "q1_low_mood",
        Depression,
        2,
        "Over the last two weeks, how often have you felt down, depressed, or hopeless?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        "q2_loss_of_interest",
        Depression,
        2,
        "How often have you had little interest or pleasure in doing things?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        "q3_nervousness",
        Anxiety,
        2,
        "How often have you felt nervous, anxious, or on edge?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        "q4_uncontrollable_worry",
        Anxiety,
        2,
        "How often have you been unable to stop or control worrying?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        SLEEP_HOURS_ITEM,
        Functioning,
        1,
        "On a typical night, how many hours do you sleep?",
        SLEEP_HOURS,
    ),
    scale_item(
        Stage::Short,
        "q6_energy_surges",
        Mania,
        2,
        "How often have you had bursts of energy where you needed much less sleep than usual?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        DIGITAL_ESCAPE,
        Functioning,
        1,
        "How often do you lose hours to screens or games to escape how you feel?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        "q8_substance_use",
        SubstanceUse,
        2,
        "How often do you use alcohol or drugs to cope?",
        USE_FREQUENCY,
    ),
    scale_item(
        Stage::Short,
        DAILY_FUNCTIONING,
        Functioning,
        2,
        "How difficult have these problems made it to work, study, or take care of things at home?",
        IMPAIRMENT,
    ),
    Question {
        is_risk_question: true,
        is_critical_risk: true,
        adaptive: Some(AdaptiveLogic {
            trigger_threshold: 1,
            follow_ups: &["q10a_suicide_plan", "q10b_means_access"],
        }),
        ..scale_item(
            Stage::Short,
            SUICIDAL_THOUGHTS,
            Suicidality,
            3,
            "How often have you had thoughts that you would be better off dead, or of hurting yourself?",
            FREQUENCY,
        )
    },
    // Follow-ups
    Question {
        is_critical_risk: true,
        ..yes_no_follow_up(
            Stage::Short,
            "q10a_suicide_plan",
            Suicidality,
            3,
            "Have you made a plan for how you would end your life?",
        )
    },
    yes_no_follow_up(
        Stage::Short,
        "q10b_means_access",
        Suicidality,
        3,
        "Do you have access to the means you have thought about using?",
    ),
];
