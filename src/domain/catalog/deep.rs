//! Deep screening: seventeen core items rated 0..=3 (max 51).

use super::question::{
    scale_item, yes_no_follow_up, AdaptiveLogic, ClinicalDomain, Question, Stage, FREQUENCY,
    IMPAIRMENT, SEVERITY_RATING, SLEEP_HOURS, USE_FREQUENCY,
};

use ClinicalDomain::*;

pub const ACTIVE_SUICIDAL_THOUGHTS: &str = "d8_active_suicidal_thoughts";
pub const HALLUCINATIONS: &str = "d11_hallucinations";
pub const PARANOID_THOUGHTS: &str = "d12_paranoid_thoughts";
pub const SLEEP_HOURS_ITEM: &str = "d15_sleep_hours";
pub const FUNCTIONAL_IMPAIRMENT: &str = "d16_functional_impairment";

pub(crate) static QUESTIONS: &[Question] = &[
    // Depression
    scale_item(
        Stage::Deep,
        "d1_depressed_mood",
        Depression,
        2,
        "How often have you felt sad or empty most of the day?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Deep,
        "d2_anhedonia",
        Depression,
        2,
        "How often have activities you used to enjoy felt pointless?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Deep,
        "d3_hopelessness",
        Depression,
        3,
        "How strongly do you feel that things will never get better?",
        SEVERITY_RATING,
    ),
    // Anxiety
    scale_item(
        Stage::Deep,
        "d4_generalized_worry",
        Anxiety,
        2,
        "How often do you worry about many different things at once?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Deep,
        "d5_panic_attacks",
        Anxiety,
        2,
        "How often have you had sudden episodes of intense fear with a racing heart or shortness of breath?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Deep,
        "d6_avoidance",
        Anxiety,
        1,
        "How often do you avoid places or situations because they make you anxious?",
        FREQUENCY,
    ),
    // Suicidality
    Question {
        is_risk_question: true,
        ..scale_item(
            Stage::Deep,
            "d7_passive_death_wish",
            Suicidality,
            3,
            "How often have you wished you could go to sleep and not wake up?",
            FREQUENCY,
        )
    },
    Question {
        is_risk_question: true,
        is_critical_risk: true,
        adaptive: Some(AdaptiveLogic {
            trigger_threshold: 1,
            follow_ups: &["d8a_suicide_plan", "d8b_prior_attempt"],
        }),
        ..scale_item(
            Stage::Deep,
            ACTIVE_SUICIDAL_THOUGHTS,
            Suicidality,
            3,
            "How often have you actively thought about killing yourself?",
            FREQUENCY,
        )
    },
    // Mania
    scale_item(
        Stage::Deep,
        "d9_elevated_mood",
        Mania,
        2,
        "How often have you felt unusually high, euphoric, or irritable for days at a time?",
        FREQUENCY,
    ),
    scale_item(
        Stage::Deep,
        "d10_reduced_need_for_sleep",
        Mania,
        2,
        "How often have you slept very little yet felt full of energy?",
        FREQUENCY,
    ),
    // Psychosis
    Question {
        is_risk_question: true,
        adaptive: Some(AdaptiveLogic {
            trigger_threshold: 2,
            follow_ups: &["d11a_command_hallucinations"],
        }),
        ..scale_item(
            Stage::Deep,
            HALLUCINATIONS,
            Psychosis,
            3,
            "How often have you heard or seen things that other people could not?",
            FREQUENCY,
        )
    },
    Question {
        is_risk_question: true,
        ..scale_item(
            Stage::Deep,
            PARANOID_THOUGHTS,
            Psychosis,
            3,
            "How often have you felt that people were plotting against you or controlling your thoughts?",
            FREQUENCY,
        )
    },
    // Substance use
    Question {
        adaptive: Some(AdaptiveLogic {
            trigger_threshold: 2,
            follow_ups: &["d13a_morning_use"],
        }),
        ..scale_item(
            Stage::Deep,
            "d13_alcohol_use",
            SubstanceUse,
            2,
            "How often do you have four or more drinks on one occasion?",
            USE_FREQUENCY,
        )
    },
    scale_item(
        Stage::Deep,
        "d14_drug_use",
        SubstanceUse,
        2,
        "How often do you use recreational drugs or medication not as prescribed?",
        USE_FREQUENCY,
    ),
    // Functioning
    scale_item(
        Stage::Deep,
        SLEEP_HOURS_ITEM,
        Functioning,
        1,
        "Over the past month, how many hours have you slept on a typical night?",
        SLEEP_HOURS,
    ),
    scale_item(
        Stage::Deep,
        FUNCTIONAL_IMPAIRMENT,
        Functioning,
        2,
        "How much have your symptoms interfered with work, school, or relationships?",
        IMPAIRMENT,
    ),
    scale_item(
        Stage::Deep,
        "d17_social_withdrawal",
        Functioning,
        1,
        "How often have you pulled away from friends and family?",
        FREQUENCY,
    ),
    // Follow-ups
    Question {
        is_critical_risk: true,
        ..yes_no_follow_up(
            Stage::Deep,
            "d8a_suicide_plan",
            Suicidality,
            3,
            "Have you worked out how or when you would end your life?",
        )
    },
    yes_no_follow_up(
        Stage::Deep,
        "d8b_prior_attempt",
        Suicidality,
        3,
        "Have you ever attempted to end your life?",
    ),
    Question {
        is_critical_risk: true,
        ..yes_no_follow_up(
            Stage::Deep,
            "d11a_command_hallucinations",
            Psychosis,
            3,
            "Do the voices tell you to harm yourself or others?",
        )
    },
    Question {
        is_risk_question: false,
        ..yes_no_follow_up(
            Stage::Deep,
            "d13a_morning_use",
            SubstanceUse,
            2,
            "Do you drink or use in the morning to steady your nerves?",
        )
    },
];
