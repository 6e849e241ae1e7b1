// Event loop - run() and action dispatch

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use super::{App, POLL_INTERVAL};
use crate::action::Action;
use crate::components::Component;
use crate::error::{Result, SettingsError};

impl App {
    /// Drive the modal until it is confirmed or closed
    pub fn run(&mut self) -> Result<()> {
        loop {
            // ---- 1. Store notifications ----

            if self.modal.sync() {
                self.mark_dirty();
            }

            if !self.modal.is_open() {
                break;
            }

            // ---- 2. User input ----

            if event::poll(POLL_INTERVAL).map_err(|e| SettingsError::Terminal(e.to_string()))? {
                let event = event::read().map_err(|e| SettingsError::Terminal(e.to_string()))?;

                if let Event::Key(key) = &event {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                        tracing::info!("interrupted, discarding draft");
                        self.modal.close();
                        break;
                    }
                }

                self.mark_dirty();

                if let Some(action) = self.modal.handle_event(&event) {
                    self.dispatch(&action);
                }
            }

            if !self.modal.is_open() {
                break;
            }

            // ---- 3. Draw once if anything changed ----

            if self.needs_redraw {
                self.draw()?;
                self.needs_redraw = false;
            }
        }

        Ok(())
    }

    /// App-level reaction to actions the modal already applied
    fn dispatch(&mut self, action: &Action) {
        match action {
            Action::Resize { cols, rows } => {
                tracing::debug!(cols, rows, "terminal resized");
                self.mark_dirty();
            }
            Action::Confirm => tracing::info!("settings confirmed"),
            Action::Close => tracing::info!("settings closed without saving"),
            _ => {}
        }
    }
}
