//! Clipboard abstraction for transcript export
//!
//! Provides a trait-based interface to clipboard operations that can be mocked in tests.

/// Result type for clipboard operations
pub type ClipboardResult<T> = Result<T, ClipboardError>;

/// Clipboard error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClipboardError {
    /// Clipboard initialization failed
    #[error("Clipboard init failed: {0}")]
    InitFailed(String),
    /// Copy operation failed
    #[error("Clipboard operation failed: {0}")]
    OperationFailed(String),
}

/// Trait for clipboard operations (allows mocking in tests)
pub trait ClipboardProvider {
    /// Copy text to clipboard
    fn set_text(&mut self, text: &str) -> ClipboardResult<()>;
}

/// Real clipboard implementation using arboard
pub struct RealClipboard {
    inner: arboard::Clipboard,
}

impl RealClipboard {
    /// Create new real clipboard instance
    pub fn new() -> ClipboardResult<Self> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| ClipboardError::InitFailed(e.to_string()))
    }
}

impl ClipboardProvider for RealClipboard {
    fn set_text(&mut self, text: &str) -> ClipboardResult<()> {
        self.inner
            .set_text(text)
            .map_err(|e| ClipboardError::OperationFailed(e.to_string()))
    }
}
