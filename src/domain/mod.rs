//! Domain layer - pure business logic with no I/O.

pub mod assessment;
pub mod catalog;
pub mod escalation;
pub mod foundation;
pub mod intake;
