//! Chat settings and configuration

use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Transcript timestamp format used when none is configured
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Chat settings
///
/// Configuration shared by the conversation manager and the chat panel.
/// Settings are stored in JSON format and can be loaded/saved from disk.
///
/// # Example
/// ```rust,no_run
/// use formchat::settings::ChatSettings;
///
/// // Load settings (returns default if file doesn't exist)
/// let mut settings = ChatSettings::load("settings.json").expect("Failed to load");
///
/// // Rename the counterpart and save
/// settings.assistant_name = "Helper".to_string();
/// settings.save("settings.json").expect("Failed to save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Display name for the local user
    pub user_name: String,
    /// Display name for the counterpart
    pub assistant_name: String,
    /// chrono format string used for transcript timestamps
    pub timestamp_format: String,
    /// Reject state transitions outside the transition table
    pub strict_transitions: bool,
    /// Number of messages shown per page in the chat panel
    pub history_page_size: usize,
    /// Delay before the simulated reply arrives in milliseconds
    pub response_delay_ms: u64,
    /// Delay before the simulated typing indicator shows in milliseconds
    pub typing_delay_ms: u64,
}

impl ChatSettings {
    /// Load settings from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// The loaded settings, or default settings if file doesn't exist
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read settings: {}", e)))?;

        // Handle empty file (return defaults)
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut settings: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Storage(format!("Failed to parse settings: {}", e)))?;

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to save the settings file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create settings directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Storage(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, json)
            .map_err(|e| Error::Storage(format!("Failed to write settings: {}", e)))?;

        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Check that the settings can be used as-is
    ///
    /// # Errors
    /// * `Error::Storage` - `timestamp_format` is not a valid chrono format
    pub fn validate(&self) -> Result<()> {
        if !is_valid_timestamp_format(&self.timestamp_format) {
            return Err(Error::Storage(format!(
                "Invalid timestamp format: {:?}",
                self.timestamp_format
            )));
        }
        Ok(())
    }

    /// Replace blank names and page sizes with their defaults
    fn normalize(&mut self) {
        let defaults = Self::default();
        if self.user_name.trim().is_empty() {
            self.user_name = defaults.user_name;
        }
        if self.assistant_name.trim().is_empty() {
            self.assistant_name = defaults.assistant_name;
        }
        if self.timestamp_format.is_empty() {
            self.timestamp_format = defaults.timestamp_format;
        }
        if self.history_page_size == 0 {
            self.history_page_size = defaults.history_page_size;
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            user_name: "You".to_string(),
            assistant_name: "Assistant".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            strict_transitions: true,
            history_page_size: 50,
            response_delay_ms: 1500,
            typing_delay_ms: 400,
        }
    }
}

/// Whether chrono can render every item of a strftime format string
pub fn is_valid_timestamp_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}
