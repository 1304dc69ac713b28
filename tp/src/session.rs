//! Session storage for trip contexts
//!
//! One [`TripContext`] per conversation, keyed by a generated session id.
//! The in-memory implementation backs tests and single-process use; a
//! persistent store only needs to implement [`SessionRepository`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::context::TripContext;

/// Opaque conversation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Start a new session with an empty context
    async fn create(&self) -> (SessionId, TripContext);

    /// Fetch a session's context, None for unknown ids
    async fn get(&self, id: &SessionId) -> Option<TripContext>;

    /// Replace a session's context; false for unknown ids
    async fn update(&self, id: &SessionId, context: TripContext) -> bool;
}

/// Process-local repository
#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, TripContext>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self) -> (SessionId, TripContext) {
        let id = SessionId::generate();
        let context = TripContext::new();
        self.sessions.write().await.insert(id, context.clone());
        debug!(%id, "session created");
        (id, context)
    }

    async fn get(&self, id: &SessionId) -> Option<TripContext> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn update(&self, id: &SessionId, context: TripContext) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(slot) => {
                *slot = context;
                true
            }
            None => {
                debug!(%id, "session update for unknown id");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = MemorySessionRepository::new();
        let (id, fresh) = repo.create().await;
        assert_eq!(fresh.confidence, 1.0);

        let context = repo.get(&id).await.unwrap();
        assert_eq!(context.confidence, 1.0);
        assert!(context.destinations.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let repo = MemorySessionRepository::new();
        assert!(repo.get(&SessionId::generate()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_round_trips() {
        let repo = MemorySessionRepository::new();
        let (id, _) = repo.create().await;

        let mut context = repo.get(&id).await.unwrap();
        context.destination_city = Some("Paris".into());
        assert!(repo.update(&id, context).await);

        let stored = repo.get(&id).await.unwrap();
        assert_eq!(stored.destination_city.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_update_unknown_is_rejected() {
        let repo = MemorySessionRepository::new();
        assert!(!repo.update(&SessionId::generate(), TripContext::new()).await);
    }
}
