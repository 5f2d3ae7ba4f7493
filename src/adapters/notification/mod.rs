//! Notification gateway adapters.
//!
//! - `RecordingNotificationGateway` - in-memory capture with injectable failures
//! - `TracingNotificationGateway` - logs each delivery

mod recording;
mod tracing_gateway;

pub use recording::{RecordedDispatch, RecordingNotificationGateway};
pub use tracing_gateway::TracingNotificationGateway;
