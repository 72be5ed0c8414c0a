use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{Answer, AskError, QaEngine};
use crate::domain::SessionId;

/// In-memory sessions with least-recently-used eviction at a fixed capacity.
pub struct SessionRegistry {
    capacity: usize,
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<SessionId, SessionEntry>,
    clock: u64,
}

struct SessionEntry {
    engine: Arc<QaEngine>,
    last_used: u64,
}

impl RegistryState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn least_recently_used(&self) -> Option<SessionId> {
        self.sessions
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| *id)
    }
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Stores `engine` under `session_id` and returns the session evicted to
    /// make room, if any. A session id is written once; re-registering is ignored.
    pub async fn register(&self, session_id: SessionId, engine: Arc<QaEngine>) -> Option<SessionId> {
        let mut state = self.state.lock().await;

        if state.sessions.contains_key(&session_id) {
            tracing::warn!(session_id = %session_id, "Session already registered, keeping original");
            return None;
        }

        let mut evicted = None;
        if state.sessions.len() >= self.capacity {
            evicted = state.least_recently_used();
            if let Some(id) = evicted {
                state.sessions.remove(&id);
            }
        }

        let last_used = state.tick();
        state
            .sessions
            .insert(session_id, SessionEntry { engine, last_used });

        if let Some(evicted) = evicted {
            tracing::info!(session_id = %evicted, "Evicted least recently used session");
        }

        evicted
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<Arc<QaEngine>> {
        let mut state = self.state.lock().await;
        let now = state.tick();
        state.sessions.get_mut(session_id).map(|entry| {
            entry.last_used = now;
            Arc::clone(&entry.engine)
        })
    }

    /// Resolves the textual session id and asks its engine. A malformed id is
    /// treated the same as an unknown one.
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<Answer, AskError> {
        let engine = match session_id.parse::<SessionId>() {
            Ok(id) => self.get(&id).await,
            Err(_) => None,
        }
        .ok_or_else(|| AskError::SessionNotFound(session_id.trim().to_string()))?;

        engine.ask(question).await
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
