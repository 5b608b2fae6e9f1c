//! Conversation threads: data model, durable store, and reconciliation
//!
//! The store owns the durable representation; the controller is its only
//! writer. Everything the chat loop touches goes through this module.

pub mod controller;
pub mod store;
pub mod types;

pub use controller::{ReconciliationController, TurnUpdate};
pub use store::{new_thread_id, SessionStore};
pub use types::{
    derive_title, ChatMessage, ConversationThread, Role, StoreState, DEFAULT_TITLE, TITLE_MAX_LEN,
};
