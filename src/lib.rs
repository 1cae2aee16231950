//! Formchat - chat conversation state for embeddable chat panels
//!
//! This library provides the conversation core behind a chat panel: message
//! history, the typing/read state machine and change notifications. A small
//! terminal chat panel built on top of it lives in the `tui` module.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chat;
pub mod settings;
pub mod tui;

use chat::ChatState;

/// Result type alias for Formchat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Formchat operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty or missing message text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transition rejected by strict transition checking
    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidState {
        /// State the conversation was in
        from: ChatState,
        /// State the operation tried to enter
        to: ChatState,
    },

    /// No message with the given id in the history
    #[error("Message not found: {0}")]
    MessageNotFound(u64),

    /// Settings file error
    #[error("Storage error: {0}")]
    Storage(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Initialize the Formchat library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}
