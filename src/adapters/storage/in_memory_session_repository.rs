//! In-Memory Session Repository
//!
//! Stores assessment sessions in memory. Sessions do not survive a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::domain::intake::AssessmentSession;
use crate::ports::SessionRepository;

/// In-memory storage for assessment sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, AssessmentSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Clear all stored sessions (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &AssessmentSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id()) {
            return Err(DomainError::new(
                ErrorCode::StorageError,
                format!("session {} already exists", session.id()),
            ));
        }
        sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &AssessmentSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id()) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("session {} not found", session.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<AssessmentSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }
}
