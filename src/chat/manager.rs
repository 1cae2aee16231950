//! Conversation history owner and change notifications

use crate::{
    chat::{export, message::ChatMessage, state::ChatState},
    settings::ChatSettings,
    Error, Result,
};
use std::fmt;
use uuid::Uuid;

type MessageCallback = Box<dyn FnMut(&ChatMessage) + Send>;
type StateCallback = Box<dyn FnMut(ChatState, ChatState) + Send>;
type ClearedCallback = Box<dyn FnMut() + Send>;

/// Handle returned by callback registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Single owner of a conversation
///
/// Holds the ordered message history, the current [`ChatState`], both typing
/// flags and the registered observers. All mutation goes through the methods
/// below and observers are called synchronously, in registration order,
/// before the mutating call returns.
///
/// # Example
/// ```rust
/// use formchat::chat::{ChatManager, ChatState};
///
/// # fn example() -> formchat::Result<()> {
/// let mut chat = ChatManager::new();
/// chat.on_state_changed(|old, new| println!("{} -> {}", old, new));
///
/// chat.send_message("hi")?;
/// assert_eq!(chat.state(), ChatState::WaitingResponse);
///
/// chat.receive_message("hello")?;
/// assert_eq!(chat.unread_count(), 1);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct ChatManager {
    session_id: Uuid,
    settings: ChatSettings,
    messages: Vec<ChatMessage>,
    state: ChatState,
    user_typing: bool,
    assistant_typing: bool,
    /// A user message is still waiting for its reply
    awaiting_response: bool,
    next_message_id: u64,
    next_callback_id: u64,
    message_callbacks: Vec<(CallbackId, MessageCallback)>,
    state_callbacks: Vec<(CallbackId, StateCallback)>,
    cleared_callbacks: Vec<(CallbackId, ClearedCallback)>,
}

impl ChatManager {
    /// Create a new manager with default settings
    pub fn new() -> Self {
        Self::with_settings(ChatSettings::default())
    }

    /// Create a new manager with the given settings
    pub fn with_settings(settings: ChatSettings) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(
            "Chat session {} started (strict transitions: {})",
            session_id,
            settings.strict_transitions
        );

        Self {
            session_id,
            settings,
            messages: Vec::new(),
            state: ChatState::Idle,
            user_typing: false,
            assistant_typing: false,
            awaiting_response: false,
            next_message_id: 1,
            next_callback_id: 1,
            message_callbacks: Vec::new(),
            state_callbacks: Vec::new(),
            cleared_callbacks: Vec::new(),
        }
    }

    // Observers

    /// Register a callback fired for every appended message (sent or received)
    pub fn on_message_received<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut(&ChatMessage) + Send + 'static,
    {
        let id = self.next_callback_id();
        self.message_callbacks.push((id, Box::new(callback)));
        id
    }

    /// Register a callback fired with `(old, new)` on every state transition
    pub fn on_state_changed<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut(ChatState, ChatState) + Send + 'static,
    {
        let id = self.next_callback_id();
        self.state_callbacks.push((id, Box::new(callback)));
        id
    }

    /// Register a callback fired after the history has been cleared
    pub fn on_history_cleared<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.next_callback_id();
        self.cleared_callbacks.push((id, Box::new(callback)));
        id
    }

    /// Unregister a callback
    ///
    /// # Returns
    /// `true` if a callback with this id was registered
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callback_count();
        self.message_callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.state_callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.cleared_callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.callback_count() != before
    }

    // Mutations

    /// Append a message authored by the local user
    ///
    /// The message is stored already read and both typing flags are cleared.
    /// The state passes through `Sending` to `WaitingResponse`, notifying
    /// observers of both steps after the message-added callbacks.
    ///
    /// # Errors
    /// * `Error::InvalidInput` - text is empty or whitespace only
    /// * `Error::InvalidState` - strict transitions are on and sending is
    ///   not allowed from the current state
    ///
    /// On error nothing changes and no callback fires.
    pub fn send_message(&mut self, text: impl Into<String>) -> Result<ChatMessage> {
        let text = self.validate_text(text.into())?;
        self.check_transition(ChatState::Sending)?;

        let message = ChatMessage::new(self.next_message_id(), text, true);
        self.messages.push(message.clone());
        self.user_typing = false;
        self.assistant_typing = false;
        self.awaiting_response = true;

        tracing::info!("Session {}: message {} sent", self.session_id, message.id);

        self.notify_message(&message);
        self.transition(ChatState::Sending);
        self.transition(ChatState::WaitingResponse);

        Ok(message)
    }

    /// Append a message authored by the counterpart
    ///
    /// The message starts unread. Both typing flags are cleared, any
    /// outstanding reply is considered answered and the state returns to
    /// `Idle`.
    ///
    /// # Errors
    /// * `Error::InvalidInput` - text is empty or whitespace only
    pub fn receive_message(&mut self, text: impl Into<String>) -> Result<ChatMessage> {
        let text = self.validate_text(text.into())?;
        self.check_transition(ChatState::Idle)?;

        let message = ChatMessage::new(self.next_message_id(), text, false);
        self.messages.push(message.clone());
        self.user_typing = false;
        self.assistant_typing = false;
        self.awaiting_response = false;

        tracing::info!(
            "Session {}: message {} received ({} unread)",
            self.session_id,
            message.id,
            self.unread_count()
        );

        self.notify_message(&message);
        self.transition(ChatState::Idle);

        Ok(message)
    }

    /// Set whether the local user is typing
    ///
    /// Setting the flag to its current value does nothing.
    ///
    /// # Errors
    /// * `Error::InvalidState` - strict transitions are on and the resulting
    ///   transition is not allowed; the flag is left unchanged
    pub fn set_user_typing(&mut self, typing: bool) -> Result<()> {
        if self.user_typing == typing {
            return Ok(());
        }

        let next = if typing {
            ChatState::UserTyping
        } else {
            self.resting_state(self.assistant_typing, ChatState::AssistantTyping)
        };
        self.check_transition(next)?;

        self.user_typing = typing;
        self.transition(next);
        Ok(())
    }

    /// Set whether the counterpart is typing
    ///
    /// Setting the flag to its current value does nothing.
    ///
    /// # Errors
    /// * `Error::InvalidState` - strict transitions are on and the resulting
    ///   transition is not allowed; the flag is left unchanged
    pub fn set_assistant_typing(&mut self, typing: bool) -> Result<()> {
        if self.assistant_typing == typing {
            return Ok(());
        }

        let next = if typing {
            ChatState::AssistantTyping
        } else {
            self.resting_state(self.user_typing, ChatState::UserTyping)
        };
        self.check_transition(next)?;

        self.assistant_typing = typing;
        self.transition(next);
        Ok(())
    }

    /// Mark every message as read
    ///
    /// Fires no callbacks and never changes the state.
    ///
    /// # Returns
    /// Number of messages that were unread before the call
    pub fn mark_all_read(&mut self) -> usize {
        let mut marked = 0;
        for message in self.messages.iter_mut().filter(|m| !m.read) {
            message.mark_read();
            marked += 1;
        }

        if marked > 0 {
            tracing::debug!("Session {}: marked {} messages read", self.session_id, marked);
        }
        marked
    }

    /// Mark a single message as read
    ///
    /// # Returns
    /// `true` if the message was unread before the call
    ///
    /// # Errors
    /// * `Error::MessageNotFound` - no message with this id in the history
    pub fn mark_read(&mut self, id: u64) -> Result<bool> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(Error::MessageNotFound(id))?;

        let was_unread = !message.read;
        message.mark_read();
        Ok(was_unread)
    }

    /// Remove every message and return to `Idle`
    ///
    /// History-cleared callbacks fire first, then state-changed callbacks if
    /// the state was not already `Idle`. Message ids keep increasing after a
    /// clear.
    pub fn clear_history(&mut self) {
        let removed = self.messages.len();
        self.messages.clear();
        self.user_typing = false;
        self.assistant_typing = false;
        self.awaiting_response = false;

        tracing::info!("Session {}: cleared {} messages", self.session_id, removed);

        for (_, callback) in self.cleared_callbacks.iter_mut() {
            callback();
        }
        self.transition(ChatState::Idle);
    }

    // Accessors

    /// Get the most recent `limit` messages, oldest first
    ///
    /// `None` or `Some(0)` returns the full history. Read flags are not
    /// touched.
    pub fn get_history(&self, limit: Option<usize>) -> &[ChatMessage] {
        match limit {
            Some(limit) if limit > 0 => {
                let start = self.messages.len().saturating_sub(limit);
                &self.messages[start..]
            }
            _ => &self.messages,
        }
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Look up a message by id
    pub fn get_message(&self, id: u64) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Most recently appended message
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages in the history
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of counterpart messages not yet read
    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_unread()).count()
    }

    /// Current conversation state
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// True if either side is typing
    pub fn is_typing(&self) -> bool {
        self.user_typing || self.assistant_typing
    }

    /// True if the local user is typing
    pub fn is_user_typing(&self) -> bool {
        self.user_typing
    }

    /// True if the counterpart is typing
    pub fn is_assistant_typing(&self) -> bool {
        self.assistant_typing
    }

    /// True between a sent message and the next received one
    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Session identifier used in log output
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Settings this manager was created with
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Render the whole history as a plain-text transcript
    pub fn export_text(&self) -> String {
        export::export_text(&self.messages, &self.settings)
    }

    // Internals

    fn next_message_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    fn next_callback_id(&mut self) -> CallbackId {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        id
    }

    fn callback_count(&self) -> usize {
        self.message_callbacks.len() + self.state_callbacks.len() + self.cleared_callbacks.len()
    }

    fn validate_text(&self, text: String) -> Result<String> {
        if text.trim().is_empty() {
            tracing::warn!("Session {}: rejected empty message", self.session_id);
            return Err(Error::InvalidInput("message text is empty".to_string()));
        }
        Ok(text)
    }

    /// State to settle in when one side stops typing
    fn resting_state(&self, other_typing: bool, other_state: ChatState) -> ChatState {
        if other_typing {
            other_state
        } else if self.awaiting_response {
            ChatState::WaitingResponse
        } else {
            ChatState::Idle
        }
    }

    fn check_transition(&self, next: ChatState) -> Result<()> {
        if self.settings.strict_transitions && !self.state.can_transition_to(next) {
            tracing::warn!(
                "Session {}: rejected transition {:?} -> {:?}",
                self.session_id,
                self.state,
                next
            );
            return Err(Error::InvalidState {
                from: self.state,
                to: next,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: ChatState) {
        if self.state == next {
            return;
        }

        let old = self.state;
        self.state = next;
        tracing::debug!("Session {}: {:?} -> {:?}", self.session_id, old, next);

        for (_, callback) in self.state_callbacks.iter_mut() {
            callback(old, next);
        }
    }

    fn notify_message(&mut self, message: &ChatMessage) {
        for (_, callback) in self.message_callbacks.iter_mut() {
            callback(message);
        }
    }
}

impl Default for ChatManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChatManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatManager")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("message_count", &self.messages.len())
            .field("user_typing", &self.user_typing)
            .field("assistant_typing", &self.assistant_typing)
            .field("awaiting_response", &self.awaiting_response)
            .field("callbacks", &self.callback_count())
            .finish()
    }
}
