//! Chat panel rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use crate::chat::ChatState;
use crate::tui::app::App;

/// Renders the chat panel
pub fn render_chat_view(f: &mut Frame, app: &App) {
    let size = f.size();
    let settings = app.chat.settings();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Min(5),     // Message history
            Constraint::Length(3),  // Input box
            Constraint::Length(3),  // Status/Help
        ])
        .split(size);

    // Title - counterpart name, state and unread counter
    let unread = app.chat.unread_count();
    let title_text = if unread > 0 {
        format!("Chat with {} - {} ({} unread)", settings.assistant_name, app.chat.state(), unread)
    } else {
        format!("Chat with {} - {}", settings.assistant_name, app.chat.state())
    };
    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Message history
    let history = app.visible_history();
    if history.is_empty() {
        let empty_msg = Paragraph::new("No messages yet. Type a message below and press Enter to send.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Messages"));
        f.render_widget(empty_msg, chunks[1]);
    } else {
        let total = history.len();
        let visible_height = chunks[1].height.saturating_sub(2) as usize; // Subtract borders
        let end_idx = total.saturating_sub(app.screen.scroll_offset).max(1);
        let start_idx = end_idx.saturating_sub(visible_height);

        let mut message_lines: Vec<Line> = history[start_idx..end_idx]
            .iter()
            .map(|msg| {
                let timestamp = msg.timestamp.format("%H:%M:%S").to_string();
                let sender_color = if msg.is_user { Color::Green } else { Color::Blue };
                let text_style = if msg.is_unread() {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{}: ", msg.sender(settings)),
                        Style::default().fg(sender_color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(msg.text.clone(), text_style),
                    Span::styled(
                        format!(" {}", msg.status_marker()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect();

        if app.chat.state() == ChatState::AssistantTyping && app.screen.is_following() {
            message_lines.push(Line::from(Span::styled(
                format!("{} is typing...", settings.assistant_name),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        let messages_widget = Paragraph::new(message_lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Messages ({}/{})", end_idx, total)),
            );
        f.render_widget(messages_widget, chunks[1]);
    }

    // Input box
    let input_widget = Paragraph::new(app.screen.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Type your message"),
        );
    f.render_widget(input_widget, chunks[2]);

    // Status/Help
    let (help_text, help_color) = match &app.screen.status_message {
        Some(status) if app.screen.is_error => (status.clone(), Color::Red),
        Some(status) => (status.clone(), Color::Green),
        None => (
            "Enter: Send | PgUp/PgDn: Scroll | Ctrl+R: Read | Ctrl+L: Clear | Ctrl+E: Copy | Esc: Quit"
                .to_string(),
            Color::DarkGray,
        ),
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(help_color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}
