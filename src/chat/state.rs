//! Conversation state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation state
///
/// Exactly one state is active at a time. Transitions are driven by the
/// caller through [`ChatManager`](crate::chat::ChatManager); there are no
/// timers here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChatState {
    /// Nothing in progress
    #[default]
    Idle,
    /// Local user is composing a message
    UserTyping,
    /// A user message is being appended
    Sending,
    /// User message sent, reply outstanding
    WaitingResponse,
    /// Counterpart is composing a reply
    AssistantTyping,
}

impl ChatState {
    /// Get all states in declaration order
    pub fn all() -> [Self; 5] {
        [
            Self::Idle,
            Self::UserTyping,
            Self::Sending,
            Self::WaitingResponse,
            Self::AssistantTyping,
        ]
    }

    /// Whether `next` is a legal transition from this state
    ///
    /// Staying in the same state is not a transition and always allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ChatState::*;

        if self == next {
            return true;
        }

        matches!(
            (self, next),
            // Typing flags cleared from any state
            (_, Idle)
                | (Idle, UserTyping)
                | (Idle, Sending)
                | (UserTyping, Sending)
                | (Sending, WaitingResponse)
                | (WaitingResponse, AssistantTyping)
                // Indicator dropped while the reply is still outstanding
                | (AssistantTyping, WaitingResponse)
        )
    }

    /// True for the two typing-indicator states
    pub fn is_typing(self) -> bool {
        matches!(self, Self::UserTyping | Self::AssistantTyping)
    }

    /// Get status label for the chat panel
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::UserTyping => "Typing...",
            Self::Sending => "Sending...",
            Self::WaitingResponse => "Waiting for response",
            Self::AssistantTyping => "Assistant is typing...",
        }
    }
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
