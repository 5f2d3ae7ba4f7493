//! Intake Triage - staged clinical intake scoring and crisis escalation.
//!
//! Patients answer a background history, a short screening questionnaire
//! and, when warranted, a deep screening. Answers are scored into severity
//! bands, scanned for risk flags, and resolved into a care pathway.
//! Critical flags raise crisis alerts that escalate on a timer unless a
//! clinician acknowledges them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
