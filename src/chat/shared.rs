//! Thread-safe chat manager handle for concurrent access

use crate::{
    chat::{manager::ChatManager, message::ChatMessage, state::ChatState},
    settings::ChatSettings,
    Result,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe handle around a [`ChatManager`]
///
/// Every call takes the lock for its whole duration, so history mutation and
/// callback dispatch are serialised across tasks. Callbacks run while the
/// lock is held and must not call back into the same handle.
///
/// # Example
/// ```rust,no_run
/// use formchat::chat::SharedChatManager;
///
/// # async fn example() -> formchat::Result<()> {
/// let chat = SharedChatManager::new();
///
/// let worker = chat.clone();
/// tokio::spawn(async move {
///     worker.set_assistant_typing(true).await.ok();
/// });
///
/// chat.send_message("hi").await?;
/// println!("{} unread", chat.unread_count().await);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SharedChatManager {
    inner: Arc<Mutex<ChatManager>>,
}

impl SharedChatManager {
    /// Create a shared manager with default settings
    pub fn new() -> Self {
        Self::from_manager(ChatManager::new())
    }

    /// Create a shared manager with the given settings
    pub fn with_settings(settings: ChatSettings) -> Self {
        Self::from_manager(ChatManager::with_settings(settings))
    }

    /// Wrap an existing manager, keeping its history and callbacks
    pub fn from_manager(manager: ChatManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run a closure with exclusive access to the manager
    ///
    /// Use this for callback registration or for reading several values
    /// consistently.
    pub async fn with<R>(&self, f: impl FnOnce(&mut ChatManager) -> R) -> R {
        let mut manager = self.inner.lock().await;
        f(&mut *manager)
    }

    /// See [`ChatManager::send_message`]
    pub async fn send_message(&self, text: impl Into<String>) -> Result<ChatMessage> {
        self.inner.lock().await.send_message(text)
    }

    /// See [`ChatManager::receive_message`]
    pub async fn receive_message(&self, text: impl Into<String>) -> Result<ChatMessage> {
        self.inner.lock().await.receive_message(text)
    }

    /// See [`ChatManager::set_user_typing`]
    pub async fn set_user_typing(&self, typing: bool) -> Result<()> {
        self.inner.lock().await.set_user_typing(typing)
    }

    /// See [`ChatManager::set_assistant_typing`]
    pub async fn set_assistant_typing(&self, typing: bool) -> Result<()> {
        self.inner.lock().await.set_assistant_typing(typing)
    }

    /// See [`ChatManager::mark_all_read`]
    pub async fn mark_all_read(&self) -> usize {
        self.inner.lock().await.mark_all_read()
    }

    /// See [`ChatManager::clear_history`]
    pub async fn clear_history(&self) {
        self.inner.lock().await.clear_history();
    }

    /// Copy of the most recent `limit` messages, oldest first
    pub async fn get_history(&self, limit: Option<usize>) -> Vec<ChatMessage> {
        self.inner.lock().await.get_history(limit).to_vec()
    }

    /// Current conversation state
    pub async fn state(&self) -> ChatState {
        self.inner.lock().await.state()
    }

    /// Number of counterpart messages not yet read
    pub async fn unread_count(&self) -> usize {
        self.inner.lock().await.unread_count()
    }

    /// Number of messages in the history
    pub async fn message_count(&self) -> usize {
        self.inner.lock().await.message_count()
    }

    /// True if either side is typing
    pub async fn is_typing(&self) -> bool {
        self.inner.lock().await.is_typing()
    }

    /// Copy of the most recent message
    pub async fn last_message(&self) -> Option<ChatMessage> {
        self.inner.lock().await.last_message().cloned()
    }

    /// See [`ChatManager::export_text`]
    pub async fn export_text(&self) -> String {
        self.inner.lock().await.export_text()
    }
}

impl Default for SharedChatManager {
    fn default() -> Self {
        Self::new()
    }
}
