pub mod app;
pub mod ui;

use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eyre::{Result, WrapErr};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::storage::Persistence;
use crate::store::TaskStore;
use app::{App, InputMode};
use ui::ui;

/// Runs the interactive UI until the user quits.
pub fn run_tui<P: Persistence>(store: TaskStore<P>) -> Result<()> {
    // Setup terminal
    enable_raw_mode().wrap_err("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.wrap_err("TUI event loop failed")
}

fn run_app<B: Backend, P: Persistence>(terminal: &mut Terminal<B>, app: &mut App<P>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') => app.toggle_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
                KeyCode::Char('C') => app.request_clear_completed(),
                KeyCode::Char('a') => app.start_add(),
                KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
                KeyCode::Char('s') => app.cycle_status(),
                KeyCode::Char('p') => app.cycle_priority(),
                KeyCode::Char('o') => app.cycle_sort(),
                _ => {}
            },
            InputMode::Adding | InputMode::Editing => match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
            InputMode::Confirm(_) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm(),
                _ => app.cancel(),
            },
        }
    }
}
