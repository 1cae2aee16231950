//! Chat panel application state and logic

use crate::chat::{ChatManager, ChatMessage, ChatState};
use crate::settings::ChatSettings;
use crate::tui::clipboard::ClipboardProvider;
use crate::tui::screens::ChatViewScreen;
use crate::Error;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Replies used by the simulated counterpart
const CANNED_REPLIES: &[&str] = &[
    "Got it.",
    "Interesting, tell me more.",
    "I see what you mean.",
    "Let me think about that.",
    "Thanks for sharing!",
];

/// Change reported by a manager callback, drained once per tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A message was appended
    MessageAdded {
        /// Id of the new message
        id: u64,
        /// Whether the local user wrote it
        is_user: bool,
    },
    /// The conversation moved between states
    StateChanged(ChatState, ChatState),
    /// The history was cleared
    Cleared,
}

/// Simulated reply waiting for its timers
#[derive(Debug, Clone)]
pub struct PendingReply {
    /// When the typing indicator turns on
    pub typing_at: Instant,
    /// When the reply is delivered
    pub reply_at: Instant,
    /// Reply text
    pub text: String,
    /// Whether the typing indicator has been switched on
    pub typing_shown: bool,
}

/// Application state
pub struct App {
    /// Conversation core
    pub chat: ChatManager,
    /// Panel state (input, scroll, status)
    pub screen: ChatViewScreen,
    /// Should quit
    pub should_quit: bool,
    /// Simulated reply in flight
    pub pending_reply: Option<PendingReply>,
    /// Last transition seen through the state callback
    pub last_transition: Option<(ChatState, ChatState)>,
    notifications: Arc<Mutex<Vec<Notification>>>,
    clipboard: Option<Box<dyn ClipboardProvider>>,
}

impl App {
    /// Create new application
    ///
    /// # Arguments
    /// * `settings` - Chat settings (names, delays, transition policy)
    /// * `clipboard` - Clipboard for transcript export, `None` when unavailable
    pub fn new(settings: ChatSettings, clipboard: Option<Box<dyn ClipboardProvider>>) -> Self {
        let mut chat = ChatManager::with_settings(settings);
        let notifications = Arc::new(Mutex::new(Vec::new()));

        let queue = Arc::clone(&notifications);
        chat.on_message_received(move |message: &ChatMessage| {
            push_notification(&queue, Notification::MessageAdded {
                id: message.id,
                is_user: message.is_user,
            });
        });

        let queue = Arc::clone(&notifications);
        chat.on_state_changed(move |old, new| {
            push_notification(&queue, Notification::StateChanged(old, new));
        });

        let queue = Arc::clone(&notifications);
        chat.on_history_cleared(move || {
            push_notification(&queue, Notification::Cleared);
        });

        Self {
            chat,
            screen: ChatViewScreen::new(),
            should_quit: false,
            pending_reply: None,
            last_transition: None,
            notifications,
            clipboard,
        }
    }

    /// Add a character to the input and raise the typing flag
    pub fn input_char(&mut self, c: char) {
        self.screen.add_char(c);
        if let Err(e) = self.chat.set_user_typing(true) {
            // Typing while a reply is outstanding is not a transition in strict mode
            tracing::debug!("Typing indicator not shown: {}", e);
        }
    }

    /// Remove a character, dropping the typing flag once the input is empty
    pub fn backspace(&mut self) {
        self.screen.backspace();
        if self.screen.input.is_empty() {
            self.stop_typing();
        }
    }

    /// Discard the whole input
    pub fn clear_input(&mut self) {
        self.screen.clear_input();
        self.stop_typing();
    }

    /// Send the input as a user message and schedule the simulated reply
    pub fn submit(&mut self) {
        self.submit_at(Instant::now());
    }

    /// Same as [`App::submit`] with an explicit clock
    pub fn submit_at(&mut self, now: Instant) {
        let text = self.screen.input.clone();

        match self.chat.send_message(text) {
            Ok(message) => {
                self.screen.clear_input();
                self.screen.scroll_to_bottom();
                self.screen.status_message = None;
                self.schedule_reply(now, &message.text);
            }
            Err(Error::InvalidInput(_)) => {
                self.screen.set_error("Type a message before pressing Enter".to_string());
            }
            Err(Error::InvalidState { .. }) => {
                self.screen.set_error("Wait for the reply before sending again".to_string());
            }
            Err(e) => {
                tracing::error!("Failed to send message: {}", e);
                self.screen.set_error(format!("Failed to send: {}", e));
            }
        }
    }

    /// Advance the simulated reply and apply queued notifications
    pub fn tick(&mut self, now: Instant) {
        if let Some(pending) = self.pending_reply.as_mut() {
            if !pending.typing_shown && now >= pending.typing_at {
                pending.typing_shown = true;
                if let Err(e) = self.chat.set_assistant_typing(true) {
                    tracing::warn!("Failed to show typing indicator: {}", e);
                }
            }

            if now >= pending.reply_at {
                let text = pending.text.clone();
                self.pending_reply = None;
                match self.chat.receive_message(text) {
                    // The reply drops the typing flag; restore it for text still in the input
                    Ok(_) if !self.screen.input.is_empty() => {
                        if let Err(e) = self.chat.set_user_typing(true) {
                            tracing::debug!("Typing indicator not restored: {}", e);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!("Failed to deliver reply: {}", e),
                }
            }
        }

        self.apply_notifications();
    }

    /// Mark every message read
    pub fn mark_all_read(&mut self) {
        let marked = self.chat.mark_all_read();
        self.screen.set_status(format!("Marked {} messages as read", marked));
    }

    /// Clear the conversation and cancel any pending reply
    pub fn clear_history(&mut self) {
        self.pending_reply = None;
        self.chat.clear_history();
        self.screen.scroll_to_bottom();
        self.apply_notifications();
    }

    /// Copy the transcript to the clipboard
    pub fn copy_transcript(&mut self) {
        let transcript = self.chat.export_text();

        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(&transcript) {
                Ok(()) => {
                    self.screen.set_status(format!(
                        "Copied {} messages to clipboard",
                        self.chat.message_count()
                    ));
                }
                Err(e) => {
                    tracing::warn!("Failed to copy transcript: {}", e);
                    self.screen.set_error(e.to_string());
                }
            },
            None => self.screen.set_error("Clipboard unavailable".to_string()),
        }
    }

    /// Scroll towards older messages
    pub fn scroll_up(&mut self) {
        let max_offset = self.visible_history().len().saturating_sub(1);
        self.screen.scroll_up(max_offset);
    }

    /// Scroll towards newer messages
    pub fn scroll_down(&mut self) {
        self.screen.scroll_down();
    }

    /// Messages the panel renders (the configured page, oldest first)
    pub fn visible_history(&self) -> &[ChatMessage] {
        self.chat
            .get_history(Some(self.chat.settings().history_page_size))
    }

    fn stop_typing(&mut self) {
        if let Err(e) = self.chat.set_user_typing(false) {
            tracing::debug!("Typing indicator not cleared: {}", e);
        }
    }

    fn schedule_reply(&mut self, now: Instant, prompt: &str) {
        let settings = self.chat.settings();
        let mut rng = rand::thread_rng();
        let canned = CANNED_REPLIES[rng.gen_range(0..CANNED_REPLIES.len())];
        let preview: String = prompt.chars().take(40).collect();

        self.pending_reply = Some(PendingReply {
            typing_at: now + Duration::from_millis(settings.typing_delay_ms),
            reply_at: now + Duration::from_millis(settings.response_delay_ms.max(settings.typing_delay_ms)),
            text: format!("{} (re: \"{}\")", canned, preview),
            typing_shown: false,
        });
    }

    fn apply_notifications(&mut self) {
        let drained: Vec<Notification> = match self.notifications.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => return,
        };

        for notification in drained {
            match notification {
                Notification::MessageAdded { is_user: false, .. } if !self.screen.is_following() => {
                    let name = self.chat.settings().assistant_name.clone();
                    self.screen.set_status(format!("New message from {}", name));
                }
                Notification::MessageAdded { .. } => {}
                Notification::StateChanged(old, new) => {
                    self.last_transition = Some((old, new));
                }
                Notification::Cleared => {
                    self.screen.set_status("History cleared".to_string());
                }
            }
        }
    }

    /// Drain queued notifications without applying them (for inspection)
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn push_notification(queue: &Mutex<Vec<Notification>>, notification: Notification) {
    if let Ok(mut queue) = queue.lock() {
        queue.push(notification);
    }
}
