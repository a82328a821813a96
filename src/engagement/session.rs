//! Per-conversation state and the in-memory session table.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::stage::Stage;

/// A boolean that can only go from unset to set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latch(bool);

impl Latch {
    pub fn is_set(&self) -> bool {
        self.0
    }

    /// Set the latch. Returns `true` only on the call that flips it.
    pub fn set(&mut self) -> bool {
        let flipped = !self.0;
        self.0 = true;
        flipped
    }

    /// Set the latch if `condition` holds; an already-set latch stays set.
    pub fn set_if(&mut self, condition: bool) {
        if condition {
            self.set();
        }
    }
}

/// One ongoing conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    /// Received messages in arrival order.
    messages: Vec<String>,
    pub scam_detected: Latch,
    pub stage: Stage,
    /// Guards the one-shot final report.
    pub completed: Latch,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            scam_detected: Latch::default(),
            stage: Stage::default(),
            completed: Latch::default(),
        }
    }

    /// Append a message and return the new message count.
    pub fn push_message(&mut self, text: impl Into<String>) -> usize {
        self.messages.push(text.into());
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Session table keyed by session id, with one lock per session.
///
/// The map lock is held only long enough to find or insert an entry; the
/// per-session mutex serializes turns for the same id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `id`, creating it on first reference.
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session_id = %id, "Creating session");
            Arc::new(Mutex::new(Session::new(id)))
        });
        Arc::clone(session)
    }

    /// A copy of the session's current state, if it exists.
    pub async fn snapshot(&self, id: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(id).cloned()?;
        let guard = session.lock().await;
        Some(guard.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
