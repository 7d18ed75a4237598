use super::types::ConversationTurn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Hard bound on per-session history length.
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Bounded, ordered turn sequence for one session. The oldest turns are
/// evicted first once the bound is reached, so the length invariant holds
/// after every append.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    turns: Vec<ConversationTurn>,
    max_turns: usize,
}

impl SessionHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(1),
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
        if self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

pub type SessionHandle = Arc<tokio::sync::Mutex<SessionHistory>>;

/// Keyed store of session histories. `session` hands out a per-session
/// handle; the pipeline holds its lock for the whole turn, which serializes
/// concurrent requests for the same session while leaving distinct sessions
/// independent.
pub trait SessionStore: Send + Sync {
    /// Get or create the handle for a session.
    fn session(&self, session_id: &str) -> SessionHandle;

    /// Drop a session's history. Returns whether it existed.
    fn remove(&self, session_id: &str) -> bool;

    fn active_sessions(&self) -> usize;
}

pub struct MemorySessionStore {
    max_turns: usize,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl MemorySessionStore {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn session(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.lock_sessions();
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(SessionHistory::new(self.max_turns)))),
        )
    }

    fn remove(&self, session_id: &str) -> bool {
        self.lock_sessions().remove(session_id).is_some()
    }

    fn active_sessions(&self) -> usize {
        self.lock_sessions().len()
    }
}
