//! Staged intake orchestration.

mod orchestrator;

pub use orchestrator::{IntakeOrchestrator, SubmitStageResult};
