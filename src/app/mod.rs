// App module
// - mod.rs: App struct, terminal setup and teardown
// - event_loop.rs: run() loop and action dispatch
// - rendering.rs: draw method

mod event_loop;
mod rendering;

use std::io::{self, Stderr, Write};
use std::time::Duration;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::components::SettingsModal;
use crate::config::Theme;
use crate::error::{Result, SettingsError};

/// Input poll timeout per loop iteration
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The UI draws on stderr; stdout is reserved for the committed JSON
fn tui_output() -> Stderr {
    io::stderr()
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, EnterAlternateScreen, EnableBracketedPaste)
}

fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, DisableBracketedPaste)
}

pub struct App {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    modal: SettingsModal,
    theme: Theme,
    needs_redraw: bool,
}

impl App {
    /// Enter raw mode and the alternate screen. Restored on drop.
    pub fn new(modal: SettingsModal, theme: Theme) -> Result<Self> {
        enable_raw_mode().map_err(|e| SettingsError::Terminal(e.to_string()))?;
        let mut out = tui_output();
        enter_screen(&mut out).map_err(|e| SettingsError::Terminal(e.to_string()))?;

        let backend = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend).map_err(|e| SettingsError::Terminal(e.to_string()))?;

        Ok(Self {
            terminal,
            modal,
            theme,
            needs_redraw: true,
        })
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = leave_screen(&mut tui_output());
        let _ = self.terminal.show_cursor();
    }
}
