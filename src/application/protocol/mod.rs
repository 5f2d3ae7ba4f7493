//! Protocol configuration: the registry in force and its reloader.

mod registry;
mod reloader;

pub use registry::ProtocolRegistry;
pub use reloader::{ProtocolReloader, ProtocolReloaderConfig, ReloadOutcome};
