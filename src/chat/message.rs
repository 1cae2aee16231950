//! Chat message records and read-status markers

use crate::settings::ChatSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single exchanged message
///
/// Everything except `read` is fixed at creation. History entries are created
/// by [`ChatManager`](crate::chat::ChatManager); a deserialized or hand-built
/// value is a detached snapshot and never enters a manager's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Session-unique id, increasing in creation order
    pub id: u64,
    /// Message body
    pub text: String,
    /// True if authored by the local user
    pub is_user: bool,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Whether the message has been seen
    pub read: bool,
}

impl ChatMessage {
    /// Create a message stamped with the current time
    ///
    /// Own messages start read, counterpart messages start unread.
    pub(crate) fn new(id: u64, text: String, is_user: bool) -> Self {
        Self {
            id,
            text,
            is_user,
            timestamp: Utc::now(),
            read: is_user,
        }
    }

    /// Mark message as read
    pub(crate) fn mark_read(&mut self) {
        self.read = true;
    }

    /// True for a counterpart message nobody has acknowledged yet
    pub fn is_unread(&self) -> bool {
        !self.is_user && !self.read
    }

    /// Display name of the author
    pub fn sender<'a>(&self, settings: &'a ChatSettings) -> &'a str {
        if self.is_user {
            &settings.user_name
        } else {
            &settings.assistant_name
        }
    }

    /// Get human-readable read status indicator
    pub fn status_marker(&self) -> &'static str {
        match (self.is_user, self.read) {
            (_, true) => "✓✓",
            (true, false) => "✓",
            (false, false) => "",
        }
    }
}
