//! ProtocolReloader - background service that keeps the registry current.
//!
//! Polls a `ProtocolSource` on an interval. A table is swapped in only when
//! its version differs from the one in force. A failed load keeps the
//! previous table and logs a warning.
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a `watch` channel and returns once `true` is sent or
//! the sender is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use super::registry::ProtocolRegistry;
use crate::ports::{ProtocolSource, ProtocolSourceError};

/// Shortest allowed poll interval; shorter values are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the ProtocolReloader service.
#[derive(Debug, Clone)]
pub struct ProtocolReloaderConfig {
    /// How often to poll the source.
    pub poll_interval: Duration,
}

impl Default for ProtocolReloaderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
        }
    }
}

impl ProtocolReloaderConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }
}

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new version is in force.
    Swapped { from: u64, to: u64 },
    /// The source still holds the version in force.
    Unchanged { version: u64 },
}

pub struct ProtocolReloader {
    source: Arc<dyn ProtocolSource>,
    registry: Arc<ProtocolRegistry>,
    config: ProtocolReloaderConfig,
}

impl ProtocolReloader {
    pub fn new(source: Arc<dyn ProtocolSource>, registry: Arc<ProtocolRegistry>) -> Self {
        Self::with_config(source, registry, ProtocolReloaderConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn ProtocolSource>,
        registry: Arc<ProtocolRegistry>,
        config: ProtocolReloaderConfig,
    ) -> Self {
        Self {
            source,
            registry,
            config,
        }
    }

    /// Run the reload loop until the shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if self.config.poll_interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                requested = ?self.config.poll_interval,
                applied = ?MIN_POLL_INTERVAL,
                "protocol poll interval too short; clamping"
            );
        }
        let mut interval = time::interval(self.config.poll_interval.max(MIN_POLL_INTERVAL));
        // The first tick completes immediately; the initial table is loaded
        // by whoever built the registry.
        interval.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        tracing::info!(source = %self.source.describe(), "shutdown sender dropped; protocol reloader stopped");
                        return;
                    }
                    if *shutdown.borrow() {
                        tracing::info!(source = %self.source.describe(), "protocol reloader stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!(
                            source = %self.source.describe(),
                            version = self.registry.version(),
                            error = %e,
                            "protocol reload failed; keeping previous table"
                        );
                    }
                }
            }
        }
    }

    /// Loads the source once and swaps the table if its version changed.
    pub async fn poll_once(&self) -> Result<ReloadOutcome, ProtocolSourceError> {
        let table = self.source.load().await?;
        let current = self.registry.version();

        if table.version() == current {
            tracing::debug!(version = current, "protocol table unchanged");
            return Ok(ReloadOutcome::Unchanged { version: current });
        }

        let to = table.version();
        let protocols = table.len();
        self.registry.swap(table);
        tracing::info!(
            source = %self.source.describe(),
            from = current,
            to,
            protocols,
            "protocol table reloaded"
        );
        Ok(ReloadOutcome::Swapped { from: current, to })
    }
}
