//! Adapters - Implementations of the port interfaces.
//!
//! - `events` - event publishers (in-memory capture, tracing log)
//! - `notification` - notification gateways
//! - `protocol` - protocol table sources
//! - `storage` - session repositories

pub mod events;
pub mod notification;
pub mod protocol;
pub mod storage;

pub use events::{InMemoryEventBus, LoggingEventPublisher};
pub use notification::{RecordedDispatch, RecordingNotificationGateway, TracingNotificationGateway};
pub use protocol::YamlProtocolSource;
pub use storage::InMemorySessionRepository;
