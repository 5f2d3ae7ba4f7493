//! Escalation protocols keyed by (alert type, severity).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::assessment::Severity;

/// Kind of crisis an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    SuicideRisk,
    PsychosisCrisis,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertType::SuicideRisk => "suicide_risk",
            AlertType::PsychosisCrisis => "psychosis_crisis",
        };
        write!(f, "{}", s)
    }
}

/// Identifier of a clinician group that receives crisis notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationGroupId(String);

impl NotificationGroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NotificationGroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NotificationGroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn default_human_in_loop() -> bool {
    true
}

/// Escalation policy for one (alert type, severity) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub auto_escalation_enabled: bool,
    #[serde(default)]
    pub escalation_timeout_minutes: u32,
    #[serde(default)]
    pub required_actions: Vec<String>,
    pub notification_groups: Vec<NotificationGroupId>,
    #[serde(default)]
    pub emergency_services_authorized: bool,
    /// Forbids automatic transitions into `resolved` or `false_positive`.
    #[serde(default = "default_human_in_loop")]
    pub human_in_loop: bool,
}

impl Protocol {
    /// Most conservative policy, used when no record is configured.
    ///
    /// Human-in-loop, no auto-escalation, emergency services authorized.
    pub fn conservative_default(
        alert_type: AlertType,
        severity: Severity,
        fallback_group: NotificationGroupId,
    ) -> Self {
        Self {
            alert_type,
            severity,
            auto_escalation_enabled: false,
            escalation_timeout_minutes: 0,
            required_actions: vec![
                "Contact the patient immediately".to_string(),
                "Complete a clinician risk assessment".to_string(),
                "Configure an escalation protocol for this alert type".to_string(),
            ],
            notification_groups: vec![fallback_group],
            emergency_services_authorized: true,
            human_in_loop: true,
        }
    }

    /// Timer duration when auto-escalation is enabled.
    pub fn escalation_timeout(&self) -> Option<Duration> {
        self.auto_escalation_enabled
            .then(|| Duration::from_secs(u64::from(self.escalation_timeout_minutes) * 60))
    }

    fn key(&self) -> (AlertType, Severity) {
        (self.alert_type, self.severity)
    }

    fn check(&self) -> Result<(), ProtocolTableError> {
        let invalid = |reason: &str| ProtocolTableError::Invalid {
            alert_type: self.alert_type,
            severity: self.severity,
            reason: reason.to_string(),
        };
        if self.notification_groups.is_empty() {
            return Err(invalid("at least one notification group is required"));
        }
        if self.auto_escalation_enabled && self.escalation_timeout_minutes == 0 {
            return Err(invalid(
                "escalation_timeout_minutes must be positive when auto-escalation is enabled",
            ));
        }
        Ok(())
    }
}

/// Errors building a protocol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolTableError {
    #[error("duplicate protocol for ({alert_type}, {severity})")]
    Duplicate {
        alert_type: AlertType,
        severity: Severity,
    },

    #[error("invalid protocol for ({alert_type}, {severity}): {reason}")]
    Invalid {
        alert_type: AlertType,
        severity: Severity,
        reason: String,
    },
}

/// Serialized form of a protocol table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolDocument {
    pub version: u64,
    #[serde(default)]
    pub protocols: Vec<Protocol>,
}

/// Immutable, versioned mapping from (alert type, severity) to protocol.
///
/// Replaced whole on reload; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolTable {
    version: u64,
    protocols: HashMap<(AlertType, Severity), Protocol>,
}

impl ProtocolTable {
    /// An empty table. Every lookup misses.
    pub fn empty(version: u64) -> Self {
        Self {
            version,
            protocols: HashMap::new(),
        }
    }

    /// Builds a table, rejecting duplicate keys and unusable records.
    pub fn from_document(document: ProtocolDocument) -> Result<Self, ProtocolTableError> {
        let mut protocols = HashMap::with_capacity(document.protocols.len());
        for protocol in document.protocols {
            protocol.check()?;
            let key = protocol.key();
            if protocols.insert(key, protocol).is_some() {
                return Err(ProtocolTableError::Duplicate {
                    alert_type: key.0,
                    severity: key.1,
                });
            }
        }
        Ok(Self {
            version: document.version,
            protocols,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn lookup(&self, alert_type: AlertType, severity: Severity) -> Option<&Protocol> {
        self.protocols.get(&(alert_type, severity))
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Protocols sorted by key, for display.
    pub fn sorted(&self) -> Vec<&Protocol> {
        let mut all: Vec<&Protocol> = self.protocols.values().collect();
        all.sort_by_key(|p| p.key());
        all
    }
}
