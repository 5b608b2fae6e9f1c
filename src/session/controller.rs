//! Turn reconciliation between the chat loop and the session store
//!
//! The controller is the only writer of [`StoreState`]. It translates a
//! user-authored turn plus an eventually-arriving remote response into
//! exactly one coherent store mutation, including when several turns are
//! submitted before the first response returns.
//!
//! The corner case it exists for: with no active thread, the user message
//! is appended immediately and the assistant reply lands shortly after,
//! once the battle finishes. Both appends must target the same thread. A
//! short-lived pending-id token remembers the thread created by the first
//! append so the second reuses it instead of allocating a twin.

use crate::error::Result;
use crate::session::store::{new_thread_id, SessionStore};
use crate::session::types::{derive_title, ChatMessage, ConversationThread, Role, StoreState};
use chrono::Utc;
use std::time::{Duration, Instant};

/// A mutation of the active thread's message sequence
pub enum TurnUpdate {
    /// Replace the sequence wholesale
    Replace(Vec<ChatMessage>),
    /// Compute the new sequence from the current one
    Apply(Box<dyn FnOnce(&[ChatMessage]) -> Vec<ChatMessage> + Send>),
}

impl TurnUpdate {
    /// Update that appends a single message
    pub fn push(message: ChatMessage) -> Self {
        TurnUpdate::Apply(Box::new(move |current| {
            let mut next = current.to_vec();
            next.push(message);
            next
        }))
    }

    fn resolve(self, current: &[ChatMessage]) -> Vec<ChatMessage> {
        match self {
            TurnUpdate::Replace(messages) => messages,
            TurnUpdate::Apply(f) => f(current),
        }
    }
}

/// Pending-id token: the thread created by an in-flight conversation start
struct PendingThread {
    id: String,
    born: Instant,
}

/// Mediates message submission, the session store, and async completions
///
/// Owns the in-memory [`StoreState`] and writes every mutation through the
/// [`SessionStore`]. See the module docs for the pending-id rationale.
pub struct ReconciliationController {
    store: SessionStore,
    state: StoreState,
    pending: Option<PendingThread>,
    pending_window: Duration,
}

impl ReconciliationController {
    /// Load persisted state and build a controller over it
    ///
    /// Reconciles the active-thread pointer immediately so a thread deleted
    /// by an earlier session cannot stay selected.
    pub fn new(store: SessionStore, pending_window: Duration) -> Self {
        let mut state = store.load();
        store.reconcile_active_id(&mut state);
        Self {
            store,
            state,
            pending: None,
            pending_window,
        }
    }

    /// The current store state
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// The currently active thread, if any
    pub fn active_thread(&self) -> Option<&ConversationThread> {
        self.state.active_thread()
    }

    /// Explicitly start a new, empty conversation and make it active
    pub fn start_thread(&mut self) -> String {
        self.pending = None;
        self.store.create_thread(&mut self.state)
    }

    /// Switch the active thread; returns false when the id is unknown
    pub fn select_thread(&mut self, id: &str) -> bool {
        if self.state.thread(id).is_none() {
            return false;
        }
        self.pending = None;
        self.state.active_thread_id = Some(id.to_string());
        self.store.persist(&self.state);
        true
    }

    /// Apply one turn mutation to the active thread, creating it if needed
    ///
    /// With an active thread: resolve the update against its messages,
    /// write the result back, refresh `updated_at`, and derive the title
    /// from the first user message while the title is still the default.
    ///
    /// With no active thread: reuse the unexpired pending id if one exists,
    /// otherwise allocate a thread and record its id as pending; either way
    /// the thread becomes active. Two calls landing inside the window
    /// therefore mutate one thread, never two.
    ///
    /// Returns the id of the thread that received the turn.
    pub fn apply_turn(&mut self, update: TurnUpdate) -> String {
        let id = match self.state.active_thread().map(|t| t.id.clone()) {
            Some(id) => {
                // An active thread settles any in-flight creation.
                self.pending = None;
                id
            }
            None => self.adopt_or_create_thread(),
        };

        if let Some(thread) = self.state.thread_mut(&id) {
            let current = std::mem::take(&mut thread.messages);
            thread.messages = update.resolve(&current);
            thread.updated_at = Utc::now();

            if thread.has_default_title() {
                if let Some(first_user) = thread.messages.iter().find(|m| m.role == Role::User) {
                    thread.title = derive_title(&first_user.content);
                }
            }
        }

        self.store.persist(&self.state);
        id
    }

    /// Append a synthetic assistant message recording a failed exchange
    ///
    /// The turn is never dropped: the thread stays a complete log whether
    /// the battle succeeded or not.
    pub fn record_exchange_failure(&mut self, error_text: &str) -> String {
        self.apply_turn(TurnUpdate::push(ChatMessage::assistant(
            format!("Error: {}", error_text),
            None,
        )))
    }

    /// Conversation history of the active thread for the battle request
    ///
    /// Returns up to `limit` of the most recent messages, oldest first.
    pub fn recent_history(&self, limit: usize) -> Vec<ChatMessage> {
        match self.active_thread() {
            Some(thread) => {
                let skip = thread.messages.len().saturating_sub(limit);
                thread.messages[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Resolve the thread for a turn arriving with no active selection
    fn adopt_or_create_thread(&mut self) -> String {
        if let Some(pending) = &self.pending {
            if pending.born.elapsed() <= self.pending_window {
                let id = pending.id.clone();
                if self.state.thread(&id).is_none() {
                    self.state.threads.insert(0, ConversationThread::new(id.clone()));
                }
                self.state.active_thread_id = Some(id.clone());
                return id;
            }
            // Expired token: the earlier conversation start is no longer
            // ours to join.
            self.pending = None;
        }

        let id = new_thread_id();
        self.state.threads.insert(0, ConversationThread::new(id.clone()));
        self.state.active_thread_id = Some(id.clone());
        self.pending = Some(PendingThread {
            id: id.clone(),
            born: Instant::now(),
        });
        id
    }

    /// Tear-down hook for tests and clean shutdown: flush current state
    pub fn flush(&self) -> Result<()> {
        self.store.persist(&self.state);
        Ok(())
    }
}
