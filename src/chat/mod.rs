//! Chat conversation module
//!
//! This module holds the conversation core consumed by chat panels:
//! - `message` - Immutable message records with a mutable read flag
//! - `state` - The conversation state machine
//! - `manager` - History owner and change notifications
//! - `export` - Plain-text transcript rendering
//! - `shared` - Thread-safe handle around the manager

// Submodules
pub mod export;
pub mod manager;
pub mod message;
pub mod shared;
pub mod state;

// Re-export commonly used types
pub use manager::{CallbackId, ChatManager};
pub use message::ChatMessage;
pub use shared::SharedChatManager;
pub use state::ChatState;

// Re-export main functions
pub use export::export_text;
