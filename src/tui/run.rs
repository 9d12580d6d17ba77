//! Terminal setup and teardown for the board.

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::board::Board;
use crate::tui::board::BoardApp;

/// Initialise the terminal, run the board until the user quits, then restore
/// the terminal even if the event loop failed.
pub fn run_board_tui(board: &mut Board) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(project = %board.current_project_id(), "opening board");
    let mut app = BoardApp::new(board);
    let result = app.run(&mut terminal, board);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
