//! In-memory registry of active review sessions.
//!
//! Sessions are not persisted; a restart of the service drops them and the
//! client simply starts a new one.

use std::collections::HashMap;

use palace_core::ReviewSession;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// A review session bound to the palace whose cards it walks through.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub palace_id: String,
    pub session: ReviewSession,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session. Completed sessions over the same palace are
    /// dropped, so each palace keeps at most one finished session around.
    pub async fn insert(&self, palace_id: String, session: ReviewSession) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| !(entry.palace_id == palace_id && entry.session.is_complete()));
        sessions.insert(id, SessionEntry { palace_id, session });
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionEntry> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| session_not_found(id))
    }

    /// Exclusive access to every session, held across a rating so that the
    /// stored card update and the cursor advance happen together.
    pub async fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        self.sessions.lock().await
    }

    pub async fn remove(&self, id: Uuid) -> Result<SessionEntry> {
        self.sessions
            .lock()
            .await
            .remove(&id)
            .ok_or_else(|| session_not_found(id))
    }

    /// Drop every session over a deleted palace.
    pub async fn remove_for_palace(&self, palace_id: &str) {
        self.sessions
            .lock()
            .await
            .retain(|_, entry| entry.palace_id != palace_id);
    }
}

pub(crate) fn session_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("session {id}"))
}
