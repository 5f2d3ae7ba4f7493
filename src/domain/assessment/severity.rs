//! Severity bands derived from stage totals.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::Stage;

/// Ordered overall risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Moderate,
    ModerateSevere,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Normal,
        Severity::Moderate,
        Severity::ModerateSevere,
        Severity::Severe,
    ];

    /// Short questionnaire bands: 0-7 / 8-15 / 16-20 / 21-30.
    pub fn for_short_total(total: u32) -> Self {
        match total {
            0..=7 => Severity::Normal,
            8..=15 => Severity::Moderate,
            16..=20 => Severity::ModerateSevere,
            _ => Severity::Severe,
        }
    }

    /// Deep screening bands: 0-10 / 11-20 / 21-35 / 36-51.
    pub fn for_deep_total(total: u32) -> Self {
        match total {
            0..=10 => Severity::Normal,
            11..=20 => Severity::Moderate,
            21..=35 => Severity::ModerateSevere,
            _ => Severity::Severe,
        }
    }

    /// Band lookup for a scored stage. History is unscored and always normal.
    pub fn for_stage_total(stage: Stage, total: u32) -> Self {
        match stage {
            Stage::History => Severity::Normal,
            Stage::Short => Self::for_short_total(total),
            Stage::Deep => Self::for_deep_total(total),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Moderate => "moderate",
            Severity::ModerateSevere => "moderate_severe",
            Severity::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
