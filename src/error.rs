//! Error types for arenachat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for arenachat operations
///
/// This enum encompasses all possible errors that can occur while talking to
/// the battle arena server, loading configuration, or persisting
/// conversation threads.
#[derive(Error, Debug)]
pub enum ArenaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Battle arena API errors (non-2xx responses, malformed payloads)
    #[error("Arena API error: {0}")]
    Api(String),

    /// A battle or resource that does not exist on the server
    #[error("Not found: {0}")]
    NotFound(String),

    /// Chat input handling errors (readline, attachments)
    #[error("Chat input error: {0}")]
    Input(String),

    /// Attachment loading errors (read errors, unrecognized image format)
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Conversation storage errors (sled operations)
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for arenachat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
