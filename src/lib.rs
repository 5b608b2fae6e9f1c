//! Arenachat - LLM battle arena client library
//!
//! This library provides the core functionality for the arenachat client:
//! persistent conversation threads, turn reconciliation against an
//! asynchronous battle exchange, and math-notation normalization for
//! rendered replies.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Thread data model, sled-backed store, and the
//!   reconciliation controller (the store's only writer)
//! - `arena`: Wire types and reqwest client for the battle arena HTTP
//!   contract
//! - `notation`: The multi-pass delimiter normalizer applied to text
//!   before rendering
//! - `chat_mode`: The interactive readline chat loop
//! - `commands`: Non-interactive subcommand handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use arenachat::config::Config;
//! use arenachat::session::{ReconciliationController, SessionStore};
//! use std::time::Duration;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/arenachat.yaml", None)?;
//!     config.validate()?;
//!
//!     let store = SessionStore::open(config.storage.path.as_deref())?;
//!     let _controller = ReconciliationController::new(
//!         store,
//!         Duration::from_millis(config.chat.pending_window_ms),
//!     );
//!     Ok(())
//! }
//! ```

pub mod arena;
pub mod chat_mode;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod notation;
pub mod session;

// Re-export commonly used types
pub use arena::{ArenaClient, BattleBackend};
pub use config::Config;
pub use error::{ArenaError, Result};
pub use notation::normalize;
pub use session::{ReconciliationController, SessionStore};
