//! Triage Resolver - severity plus flags to an ordered care pathway.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::flags::RiskFlag;
use super::severity::Severity;

/// Recommended care pathway, ordered by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageLevel {
    Monitor,
    Therapist,
    TherapistAndPsychiatrist,
    PsychiatristCrisis,
}

impl TriageLevel {
    /// Baseline level for a severity band.
    pub fn baseline(severity: Severity) -> Self {
        match severity {
            Severity::Normal => TriageLevel::Monitor,
            Severity::Moderate => TriageLevel::Therapist,
            Severity::ModerateSevere => TriageLevel::TherapistAndPsychiatrist,
            Severity::Severe => TriageLevel::PsychiatristCrisis,
        }
    }

    /// Scheduling action label offered to the patient. None for `monitor`.
    pub fn booking_action(&self) -> Option<&'static str> {
        match self {
            TriageLevel::Monitor => None,
            TriageLevel::Therapist => Some("Book Therapist Session"),
            TriageLevel::TherapistAndPsychiatrist => Some("Book Psychiatric Evaluation"),
            TriageLevel::PsychiatristCrisis => Some("Find Emergency Care"),
        }
    }

    fn recommendations(&self) -> &'static [&'static str] {
        match self {
            TriageLevel::Monitor => &[
                "Keep up your current self-care routines and keep track of your mood.",
                "Repeat this screening in four weeks, or sooner if things get worse.",
            ],
            TriageLevel::Therapist => &[
                "Schedule an initial session with a licensed therapist.",
                "Ask about structured talk therapy such as CBT.",
            ],
            TriageLevel::TherapistAndPsychiatrist => &[
                "Schedule a session with a licensed therapist.",
                "Book a psychiatric evaluation to review treatment and medication options.",
                "Share your results so your therapist and psychiatrist can coordinate care.",
            ],
            TriageLevel::PsychiatristCrisis => &[
                "Seek a same-day psychiatric evaluation.",
                "If you are in immediate danger, call your local emergency number or a crisis line now.",
                "Reach out to someone you trust and ask them to stay with you.",
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TriageLevel::Monitor => "monitor",
            TriageLevel::Therapist => "therapist",
            TriageLevel::TherapistAndPsychiatrist => "therapist_and_psychiatrist",
            TriageLevel::PsychiatristCrisis => "psychiatrist_crisis",
        }
    }
}

impl fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Flags that force `psychiatrist_crisis`, with the urgent line each adds.
const OVERRIDES: &[(&str, &str)] = &[
    (
        RiskFlag::SUICIDALITY_RISK,
        "URGENT: You reported thoughts of ending your life. If you feel unsafe, contact a crisis line or emergency services now.",
    ),
    (
        RiskFlag::CRITICAL_SUICIDALITY_RISK,
        "URGENT: Active suicidal thoughts were reported. A crisis clinician is being notified.",
    ),
    (
        RiskFlag::PSYCHOSIS_SYMPTOMS,
        "URGENT: Your answers suggest symptoms that need a prompt psychiatric assessment.",
    ),
    (
        RiskFlag::CRITICAL_PSYCHOSIS_RISK,
        "URGENT: Voices telling you to cause harm were reported. A crisis clinician is being notified.",
    ),
];

/// Result of triage resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub triage_level: TriageLevel,
    /// Urgent lines first, then the level's standard actions.
    pub recommendations: Vec<String>,
    pub urgent_flags: Vec<RiskFlag>,
}

impl TriageOutcome {
    pub fn booking_action(&self) -> Option<&'static str> {
        self.triage_level.booking_action()
    }
}

/// Pure triage resolution.
pub struct TriageResolver;

impl TriageResolver {
    /// Resolves severity and flags to a triage outcome.
    ///
    /// Override flags raise the level to `psychiatrist_crisis`; nothing lowers it.
    pub fn resolve(severity: Severity, flags: &[RiskFlag]) -> TriageOutcome {
        let mut level = TriageLevel::baseline(severity);
        let mut urgent_flags = Vec::new();
        let mut urgent_lines = Vec::new();

        for flag in flags {
            let Some((_, line)) = OVERRIDES.iter().find(|(tag, _)| flag == tag) else {
                continue;
            };
            if urgent_flags.contains(flag) {
                continue;
            }
            level = level.max(TriageLevel::PsychiatristCrisis);
            urgent_flags.push(flag.clone());
            urgent_lines.push((*line).to_string());
        }

        let recommendations = urgent_lines
            .into_iter()
            .chain(level.recommendations().iter().map(|s| (*s).to_string()))
            .collect();

        TriageOutcome {
            triage_level: level,
            recommendations,
            urgent_flags,
        }
    }

    /// Returns true if the flag forces a crisis pathway.
    pub fn is_override(flag: &RiskFlag) -> bool {
        OVERRIDES.iter().any(|(tag, _)| flag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(tag: &'static str) -> RiskFlag {
        RiskFlag::from_static(tag)
    }

    #[test]
    fn severity_maps_to_baseline_level() {
        let levels: Vec<_> = Severity::ALL
            .iter()
            .map(|s| TriageResolver::resolve(*s, &[]).triage_level)
            .collect();
        assert_eq!(
            levels,
            vec![
                TriageLevel::Monitor,
                TriageLevel::Therapist,
                TriageLevel::TherapistAndPsychiatrist,
                TriageLevel::PsychiatristCrisis
            ]
        );
    }

    #[test]
    fn override_flag_forces_crisis_with_normal_severity() {
        let outcome = TriageResolver::resolve(Severity::Normal, &[flag(RiskFlag::SUICIDALITY_RISK)]);

        assert_eq!(outcome.triage_level, TriageLevel::PsychiatristCrisis);
        assert_eq!(outcome.urgent_flags, vec![flag(RiskFlag::SUICIDALITY_RISK)]);
        assert!(outcome.recommendations[0].starts_with("URGENT"));
        assert_eq!(outcome.booking_action(), Some("Find Emergency Care"));
    }

    #[test]
    fn non_override_flags_keep_baseline() {
        let outcome = TriageResolver::resolve(
            Severity::Moderate,
            &[flag(RiskFlag::SEVERE_SLEEP_DISTURBANCE)],
        );
        assert_eq!(outcome.triage_level, TriageLevel::Therapist);
        assert!(outcome.urgent_flags.is_empty());
    }

    #[test]
    fn urgent_lines_follow_flag_order() {
        let outcome = TriageResolver::resolve(
            Severity::Severe,
            &[
                flag(RiskFlag::PSYCHOSIS_SYMPTOMS),
                flag(RiskFlag::SUICIDALITY_RISK),
            ],
        );

        assert_eq!(outcome.urgent_flags.len(), 2);
        assert!(outcome.recommendations[0].contains("prompt psychiatric assessment"));
        assert!(outcome.recommendations[1].contains("ending your life"));
        assert_eq!(outcome.recommendations.len(), 5);
    }

    #[test]
    fn monitor_has_no_booking_action() {
        let outcome = TriageResolver::resolve(Severity::Normal, &[]);
        assert_eq!(outcome.booking_action(), None);
    }

    #[test]
    fn resolution_is_deterministic() {
        let flags = [flag(RiskFlag::CRITICAL_PSYCHOSIS_RISK)];
        assert_eq!(
            TriageResolver::resolve(Severity::Moderate, &flags),
            TriageResolver::resolve(Severity::Moderate, &flags)
        );
    }
}
