//! Assessment session repository port.
//!
//! Persistence schema is out of scope; this is the seam the orchestrator
//! stores sessions through.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::intake::AssessmentSession;
use async_trait::async_trait;

/// Repository port for AssessmentSession aggregates.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `StorageError` on persistence failure
    async fn save(&self, session: &AssessmentSession) -> Result<(), DomainError>;

    /// Update an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    async fn update(&self, session: &AssessmentSession) -> Result<(), DomainError>;

    /// Find a session by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<AssessmentSession>, DomainError>;
}
