//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EventPublisher` - publishes crisis alert and protocol events
//! - `NotificationGateway` - delivers alerts to clinician groups
//! - `ProtocolSource` - loads the escalation protocol table
//! - `SessionRepository` - stores assessment sessions

mod event_publisher;
mod notification_gateway;
mod protocol_source;
mod session_repository;

pub use event_publisher::EventPublisher;
pub use notification_gateway::{
    AlertNotification, DeliveryError, DispatchReceipt, NotificationGateway,
};
pub use protocol_source::{ProtocolSource, ProtocolSourceError};
pub use session_repository::SessionRepository;
