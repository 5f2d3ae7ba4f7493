//! Escalation configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::escalation::NotificationGroupId;

/// Protocol source and fallback routing for crisis alerts
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// YAML protocol table. Without one every alert uses the conservative default.
    #[serde(default)]
    pub protocol_file: Option<PathBuf>,

    /// Seconds between protocol file polls
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,

    /// Group notified when no protocol matches an alert
    #[serde(default = "default_fallback_notification_group")]
    pub fallback_notification_group: String,
}

fn default_reload_interval_secs() -> u64 {
    60
}

fn default_fallback_notification_group() -> String {
    "crisis-on-call".to_string()
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            protocol_file: None,
            reload_interval_secs: default_reload_interval_secs(),
            fallback_notification_group: default_fallback_notification_group(),
        }
    }
}

impl EscalationConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }

    pub fn fallback_group(&self) -> NotificationGroupId {
        NotificationGroupId::new(self.fallback_notification_group.trim())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reload_interval_secs == 0 {
            return Err(ValidationError::InvalidReloadInterval);
        }
        if self.fallback_notification_group.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "escalation.fallback_notification_group",
            ));
        }
        Ok(())
    }
}
