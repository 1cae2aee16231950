//! Chat panel screen state

/// Chat view screen state
///
/// Holds everything about the panel that is not conversation state: the
/// input buffer, the scroll position and the status line.
#[derive(Debug, Default)]
pub struct ChatViewScreen {
    /// Input buffer for message composition
    pub input: String,
    /// Messages scrolled up from the newest (0 = follow newest)
    pub scroll_offset: usize,
    /// Status message
    pub status_message: Option<String>,
    /// Whether status is an error
    pub is_error: bool,
}

impl ChatViewScreen {
    /// Create new chat view screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Add character to input
    pub fn add_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Remove last character from input
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Clear input buffer
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Scroll towards older messages
    pub fn scroll_up(&mut self, max_offset: usize) {
        if self.scroll_offset < max_offset {
            self.scroll_offset += 1;
        }
    }

    /// Scroll towards newer messages
    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Jump back to the newest message
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Whether the newest message is in view
    pub fn is_following(&self) -> bool {
        self.scroll_offset == 0
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.is_error = false;
    }

    /// Set error status message
    pub fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.is_error = true;
    }
}
