//! Conversation thread data model
//!
//! Defines the message and thread records persisted by the session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default title assigned to a freshly created thread
///
/// Replaced once, automatically, with a snippet of the first user message.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Number of characters of the first user message used as the thread title
pub const TITLE_MAX_LEN: usize = 50;

/// Sender of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Authored by the user
    User,
    /// Produced by the arena (the winning model's reply, or a synthetic
    /// error message standing in for one)
    Assistant,
}

/// A single message in a conversation thread
///
/// `content` may be empty only when an attachment is present; the two are
/// softly mutually required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender role
    pub role: Role,

    /// Text payload
    #[serde(default)]
    pub content: String,

    /// Optional inlined image as a base64 data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,

    /// Battle id that produced this message; only set on assistant messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_ref: Option<i64>,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use arenachat::session::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Hello, arena!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachment: None,
            exchange_ref: None,
        }
    }

    /// Creates a new user message carrying an image attachment
    pub fn user_with_attachment(content: impl Into<String>, data_uri: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachment: Some(data_uri.into()),
            exchange_ref: None,
        }
    }

    /// Creates a new assistant message linked to the battle that produced it
    ///
    /// # Examples
    ///
    /// ```
    /// use arenachat::session::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::assistant("The answer is 42.", Some(7));
    /// assert_eq!(msg.role, Role::Assistant);
    /// assert_eq!(msg.exchange_ref, Some(7));
    /// ```
    pub fn assistant(content: impl Into<String>, exchange_ref: Option<i64>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            attachment: None,
            exchange_ref,
        }
    }
}

/// One independent, persisted conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    /// Stable identifier (ULID), assigned at creation, immutable
    pub id: String,

    /// Human-readable label
    pub title: String,

    /// Ordered message log; always present, even when empty
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl ConversationThread {
    /// Creates an empty thread with the given id and the default title
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the title has not been derived from a user message yet
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }
}

/// The full persisted state: all threads plus the active selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    /// Threads in display order (most-recent-first on creation)
    #[serde(default)]
    pub threads: Vec<ConversationThread>,

    /// Id of the thread currently selected for display and appends
    #[serde(default)]
    pub active_thread_id: Option<String>,
}

impl StoreState {
    /// Look up a thread by id
    pub fn thread(&self, id: &str) -> Option<&ConversationThread> {
        self.threads.iter().find(|t| t.id == id)
    }

    /// Look up a thread mutably by id
    pub fn thread_mut(&mut self, id: &str) -> Option<&mut ConversationThread> {
        self.threads.iter_mut().find(|t| t.id == id)
    }

    /// The currently active thread, when one is selected and still exists
    pub fn active_thread(&self) -> Option<&ConversationThread> {
        self.active_thread_id.as_deref().and_then(|id| self.thread(id))
    }
}

/// Derive a thread title from message content
///
/// Takes the first [`TITLE_MAX_LEN`] characters of the trimmed content,
/// falling back to the default title when nothing is left after trimming.
pub fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    trimmed.chars().take(TITLE_MAX_LEN).collect()
}
