//! UI rendering module
//!
//! The chat panel is the only screen; rendering reads the conversation
//! through `ChatManager` accessors and never mutates it.

mod chat_view;

use ratatui::Frame;
use crate::tui::app::App;

// Re-export render functions
pub use chat_view::render_chat_view;

/// Main UI rendering function
pub fn ui(f: &mut Frame, app: &App) {
    render_chat_view(f, app);
}
