//! Formchat TUI (Terminal User Interface)
//!
//! A terminal chat panel talking to a simulated assistant.
//!
//! Usage: `formchat-tui [settings.json]`

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use formchat::settings::ChatSettings;
use formchat::tui::{
    App,
    clipboard::{ClipboardProvider, RealClipboard},
    ui::ui,
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const DEFAULT_SETTINGS_PATH: &str = "formchat_settings.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = ChatSettings::load(&settings_path)?;

    // Clipboard is optional (e.g. headless or SSH sessions)
    let clipboard = match RealClipboard::new() {
        Ok(clipboard) => Some(Box::new(clipboard) as Box<dyn ClipboardProvider>),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, clipboard);

    // Run main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                match key.code {
                    KeyCode::Esc => {
                        app.should_quit = true;
                    }
                    KeyCode::Char('c') if ctrl => {
                        app.should_quit = true;
                    }
                    KeyCode::Char('r') if ctrl => {
                        app.mark_all_read();
                    }
                    KeyCode::Char('l') if ctrl => {
                        app.clear_history();
                    }
                    KeyCode::Char('e') if ctrl => {
                        app.copy_transcript();
                    }
                    KeyCode::Char('u') if ctrl => {
                        app.clear_input();
                    }
                    KeyCode::Char(c) if !c.is_control() => {
                        app.input_char(c);
                    }
                    KeyCode::Backspace => {
                        app.backspace();
                    }
                    KeyCode::Enter => {
                        app.submit();
                    }
                    KeyCode::PageUp | KeyCode::Up => {
                        app.scroll_up();
                    }
                    KeyCode::PageDown | KeyCode::Down => {
                        app.scroll_down();
                    }
                    _ => {}
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
