//! TUI (Terminal User Interface) module
//!
//! A terminal chat panel over `ChatManager`. Kept separate from the binary
//! so the panel logic can be tested without a terminal.

pub mod app;
pub mod clipboard;
pub mod screens;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, Notification, PendingReply};
pub use screens::ChatViewScreen;
