//! ProtocolSource port - loads the operator-editable protocol table.

use async_trait::async_trait;

use crate::domain::escalation::{ProtocolTable, ProtocolTableError};

/// Errors loading a protocol table.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolSourceError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse protocol document: {0}")]
    Parse(String),

    #[error(transparent)]
    Table(#[from] ProtocolTableError),
}

/// Port for loading protocol tables.
///
/// Every call returns a complete, validated table; partial tables are never
/// returned.
#[async_trait]
pub trait ProtocolSource: Send + Sync {
    async fn load(&self) -> Result<ProtocolTable, ProtocolSourceError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_source_is_object_safe() {
        fn _accepts_dyn(_source: &dyn ProtocolSource) {}
    }
}
