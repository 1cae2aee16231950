//! Plain-text transcript rendering

use crate::{
    chat::message::ChatMessage,
    settings::{is_valid_timestamp_format, ChatSettings, DEFAULT_TIMESTAMP_FORMAT},
};
use chrono::format::StrftimeItems;

/// Render messages as a human-readable transcript
///
/// Each message becomes
/// `[<timestamp>] <sender> <marker>:\n  <text>\n\n`, in the order given.
/// Unread counterpart messages have no marker and render as
/// `[<timestamp>] <sender>:`. Continuation lines of multi-line messages keep
/// the two-space indent.
///
/// An invalid `timestamp_format` falls back to the default format instead of
/// truncating the headers.
pub fn export_text(messages: &[ChatMessage], settings: &ChatSettings) -> String {
    let format = if is_valid_timestamp_format(&settings.timestamp_format) {
        settings.timestamp_format.as_str()
    } else {
        tracing::warn!(
            "Invalid timestamp format {:?}, exporting with {:?}",
            settings.timestamp_format,
            DEFAULT_TIMESTAMP_FORMAT
        );
        DEFAULT_TIMESTAMP_FORMAT
    };
    let items: Vec<_> = StrftimeItems::new(format).collect();

    let mut out = String::new();
    for message in messages {
        let timestamp = message.timestamp.format_with_items(items.iter()).to_string();
        let sender = message.sender(settings);
        let marker = message.status_marker();

        out.push('[');
        out.push_str(&timestamp);
        out.push_str("] ");
        out.push_str(sender);
        if !marker.is_empty() {
            out.push(' ');
            out.push_str(marker);
        }
        out.push_str(":\n");

        for line in message.text.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}
