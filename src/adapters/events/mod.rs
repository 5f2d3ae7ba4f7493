//! Event publisher adapters.
//!
//! - `InMemoryEventBus` - captures events for tests and the CLI
//! - `LoggingEventPublisher` - writes events to the tracing log

mod in_memory;
mod logging;

pub use in_memory::InMemoryEventBus;
pub use logging::LoggingEventPublisher;
