//! ProtocolRegistry - the protocol table currently in force.
//!
//! Holds one immutable `ProtocolTable` behind an `Arc`. Readers take a
//! snapshot and keep using it for the whole evaluation; a reload swaps the
//! `Arc` whole, so nobody ever sees a half-updated table.

use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::escalation::ProtocolTable;

#[derive(Debug)]
pub struct ProtocolRegistry {
    current: RwLock<Arc<ProtocolTable>>,
}

impl ProtocolRegistry {
    pub fn new(table: ProtocolTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// A registry with no protocols. Every alert falls back to the
    /// conservative default until a table is loaded.
    pub fn empty() -> Self {
        Self::new(ProtocolTable::empty(0))
    }

    /// The table in force right now.
    pub fn snapshot(&self) -> Arc<ProtocolTable> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// Replaces the table, returning the one it replaced.
    pub fn swap(&self, table: ProtocolTable) -> Arc<ProtocolTable> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(table))
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
